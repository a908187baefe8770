use serde::{Deserialize, Serialize};

use crate::geo::GeoBox;
use crate::math::{tile_column_to_longitude, tile_row_to_latitude};

/// Address of a tile in the web-mercator quad tree.
///
/// `row` is counted from the north edge (the `y` of `z/x/y` URLs) and
/// `column` from the antimeridian; each axis has `2^level` tiles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileKey {
    pub row: u32,
    pub column: u32,
    pub level: u32,
}

impl TileKey {
    pub fn new(row: u32, column: u32, level: u32) -> Self {
        Self { row, column, level }
    }

    /// Key for the slippy-map address `z/x/y`.
    pub fn from_slippy(x: u32, y: u32, z: u32) -> Self {
        Self::new(y, x, z)
    }

    /// Tiles per axis at this key's level.
    pub fn tiles_per_axis(&self) -> u64 {
        1u64 << self.level
    }

    pub fn is_valid(&self) -> bool {
        self.level < 32
            && u64::from(self.row) < self.tiles_per_axis()
            && u64::from(self.column) < self.tiles_per_axis()
    }

    /// Geographic bounds of the tile in the web-mercator tiling scheme.
    pub fn geo_box(&self) -> GeoBox {
        let north = tile_row_to_latitude(f64::from(self.row), self.level);
        let south = tile_row_to_latitude(f64::from(self.row) + 1.0, self.level);
        let west = tile_column_to_longitude(f64::from(self.column), self.level);
        let east = tile_column_to_longitude(f64::from(self.column) + 1.0, self.level);
        GeoBox::new(south, west, north, east)
    }
}

impl std::fmt::Display for TileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.level, self.column, self.row)
    }
}

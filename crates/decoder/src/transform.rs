use foundation::GeoBox;
use foundation::math::{
    EQUATORIAL_CIRCUMFERENCE, Vec3, latitude_to_tile_row, longitude_to_column_fraction, tile_scale,
};
use formats::TilePoint;

/// Tile-local to world transform of one tile.
///
/// With `N = log2(extent)` the tile is viewed as a block of the global
/// `2^(level + N)` pixel grid: `top`/`left` are the grid row/column of the
/// tile's north-west corner. Neighbouring tiles compute their shared edge from
/// the same grid, which keeps seams bit-compatible.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TileTransform {
    pub extent: u32,
    pub scale: f64,
    pub top: f64,
    pub left: f64,
}

impl TileTransform {
    pub fn new(extent: u32, level: u32, geo_box: &GeoBox) -> Self {
        debug_assert!(extent.is_power_of_two(), "tile extent {extent} is not a power of two");
        debug_assert!(
            geo_box.north.is_finite() && geo_box.west.is_finite(),
            "non-finite tile bounds {geo_box:?}"
        );

        let grid_level = level + extent.max(1).ilog2();
        let scale = tile_scale(grid_level);
        Self {
            extent,
            scale,
            top: latitude_to_tile_row(geo_box.north, grid_level),
            left: longitude_to_column_fraction(geo_box.west) * scale,
        }
    }

    /// Web-mercator world position (see `MercatorProjection`) of a
    /// tile-local point, on the ground.
    #[inline]
    pub fn to_world(&self, p: TilePoint) -> Vec3 {
        Vec3::new(
            ((self.left + f64::from(p.x)) / self.scale) * EQUATORIAL_CIRCUMFERENCE,
            ((self.top + f64::from(p.y)) / self.scale) * EQUATORIAL_CIRCUMFERENCE,
            0.0,
        )
    }
}

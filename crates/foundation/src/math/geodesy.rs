//! Earth constants and the web-mercator (slippy tile) row/column helpers.
//!
//! Tile rows are counted from the north edge of the mercator square, as in the
//! common `z/x/y` addressing scheme.

use std::f64::consts::PI;

/// WGS84 semi-major axis (meters). Also the radius of the reference sphere.
pub const WGS84_A: f64 = 6_378_137.0;

/// Radius of the reference sphere used by every projection (meters).
pub const EQUATORIAL_RADIUS: f64 = WGS84_A;

/// Circumference of the reference sphere at the equator (meters).
pub const EQUATORIAL_CIRCUMFERENCE: f64 = 2.0 * PI * EQUATORIAL_RADIUS;

/// Latitude at which the web-mercator square is cut off (degrees).
pub const MAX_MERCATOR_LATITUDE_DEG: f64 = 85.051_128_779_806_59;

/// Number of tiles (or tile-local units) per axis at `level`: `2^level`.
#[inline]
pub fn tile_scale(level: u32) -> f64 {
    2f64.powi(level as i32)
}

/// Position of `lat_deg` within the mercator square, 0 at the north edge and
/// 1 at the south edge.
pub fn latitude_to_row_fraction(lat_deg: f64) -> f64 {
    let lat = lat_deg.to_radians();
    (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0
}

/// Inverse of [`latitude_to_row_fraction`].
pub fn row_fraction_to_latitude(fraction: f64) -> f64 {
    (PI * (1.0 - 2.0 * fraction)).sinh().atan().to_degrees()
}

/// Position of `lon_deg` within the mercator square, 0 at -180 and 1 at 180.
pub fn longitude_to_column_fraction(lon_deg: f64) -> f64 {
    (lon_deg + 180.0) / 360.0
}

/// Fractional tile row of `lat_deg` in a grid of `2^level` rows.
pub fn latitude_to_tile_row(lat_deg: f64, level: u32) -> f64 {
    latitude_to_row_fraction(lat_deg) * tile_scale(level)
}

/// Fractional tile column of `lon_deg` in a grid of `2^level` columns.
pub fn longitude_to_tile_column(lon_deg: f64, level: u32) -> f64 {
    longitude_to_column_fraction(lon_deg) * tile_scale(level)
}

/// Latitude (degrees) of the north edge of fractional `row` at `level`.
pub fn tile_row_to_latitude(row: f64, level: u32) -> f64 {
    row_fraction_to_latitude(row / tile_scale(level))
}

/// Longitude (degrees) of the west edge of fractional `column` at `level`.
pub fn tile_column_to_longitude(column: f64, level: u32) -> f64 {
    column / tile_scale(level) * 360.0 - 180.0
}

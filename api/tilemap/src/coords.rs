//! Web-Mercator conversions between degrees, tile indices and pixels.
//!
//! None of these functions validate latitude. Mercator is undefined at the
//! poles, so latitudes must stay strictly inside (-90, 90); anything beyond
//! about ±85.05 falls off the tile grid and latitudes of ±90 produce
//! non-finite values. Clamp geographic input with [`MAX_LATITUDE`] first.

use std::f64::consts::PI;

/// Highest latitude covered by the square Web-Mercator world
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Equatorial ground resolution of a 256 pixel tile at zoom 0, in meters
const EQUATOR_METERS_PER_PIXEL: f64 = 156543.03;

fn grid_size(zoom: u8) -> f64 {
    2f64.powi(i32::from(zoom))
}

/// Convert lat/lon to tile coordinates at `zoom` (pure function)
///
/// With `round` set both values are floored to the index of the tile that
/// contains the point, otherwise the fractional position is returned.
pub fn deg2tile(lat_deg: f64, lon_deg: f64, zoom: u8, round: bool) -> (f64, f64) {
    let lat_rad = lat_deg.to_radians();
    let n = grid_size(zoom);
    let x = (lon_deg + 180.0) / 360.0 * n;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n;
    if round {
        (x.floor(), y.floor())
    } else {
        (x, y)
    }
}

/// Batched [`deg2tile`], one output per `(lat, lon)` input in the same order
pub fn deg2tile_many(points: &[(f64, f64)], zoom: u8, round: bool) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|&(lat, lon)| deg2tile(lat, lon, zoom, round))
        .collect()
}

/// Convert tile coordinates back to lat/lon (pure function)
pub fn tile2deg(x: f64, y: f64, zoom: u8) -> (f64, f64) {
    let n = grid_size(zoom);
    let lon_deg = x / n * 360.0 - 180.0;
    let lat_deg = (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();
    (lat_deg, lon_deg)
}

/// Place a lat/lon point on an image whose top-left corner is tile `origin`
pub fn pixel_from_point(
    lat_deg: f64,
    lon_deg: f64,
    zoom: u8,
    origin: (i64, i64),
    tilesize: u32,
) -> (f64, f64) {
    let (x, y) = deg2tile(lat_deg, lon_deg, zoom, false);
    let size = f64::from(tilesize);
    ((x - origin.0 as f64) * size, (y - origin.1 as f64) * size)
}

/// Batched [`pixel_from_point`]
pub fn pixels_from_points(
    points: &[(f64, f64)],
    zoom: u8,
    origin: (i64, i64),
    tilesize: u32,
) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|&(lat, lon)| pixel_from_point(lat, lon, zoom, origin, tilesize))
        .collect()
}

/// Ground distance covered by one pixel at `lat_rad` (radians)
pub fn meters_per_pixel(lat_rad: f64, zoom: u8) -> f64 {
    EQUATOR_METERS_PER_PIXEL * lat_rad.cos() / grid_size(zoom)
}

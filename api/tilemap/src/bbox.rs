//! Geographic and tile-index bounding boxes.

use crate::coords::deg2tile;
use crate::error::{MapError, Result};
use std::fmt;
use std::str::FromStr;

/// Smallest latitude extension applied by [`extend_box`], in degrees
const MIN_MARGIN_DEG: f64 = 0.0005;
/// Latitude band kept by [`extend_box`]
const LAT_LIMIT: f64 = 80.0;
const LON_LIMIT: f64 = 180.0;

/// A geographic box given by two corners in degrees.
///
/// The corners are not ordered: `lat0` may be north of `lat1` and `lon0`
/// east of `lon1`. Everything consuming a `GeoBox` sorts what it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBox {
    pub lat0: f64,
    pub lon0: f64,
    pub lat1: f64,
    pub lon1: f64,
}

impl GeoBox {
    pub fn new(lat0: f64, lon0: f64, lat1: f64, lon1: f64) -> Self {
        Self {
            lat0,
            lon0,
            lat1,
            lon1,
        }
    }

    /// A zero-area box around a single point
    pub fn point(lat: f64, lon: f64) -> Self {
        Self::new(lat, lon, lat, lon)
    }

    pub fn from_points(pos0: (f64, f64), pos1: (f64, f64)) -> Self {
        Self::new(pos0.0, pos0.1, pos1.0, pos1.1)
    }

    /// Latitude halfway between the two corners
    pub fn center_lat(&self) -> f64 {
        (self.lat0 + self.lat1) / 2.0
    }

    /// Corners sorted so that `lat0 <= lat1` and `lon0 <= lon1`
    pub fn ordered(&self) -> Self {
        Self::new(
            self.lat0.min(self.lat1),
            self.lon0.min(self.lon1),
            self.lat0.max(self.lat1),
            self.lon0.max(self.lon1),
        )
    }
}

impl From<(f64, f64)> for GeoBox {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self::point(lat, lon)
    }
}

impl From<((f64, f64), (f64, f64))> for GeoBox {
    fn from((pos0, pos1): ((f64, f64), (f64, f64))) -> Self {
        Self::from_points(pos0, pos1)
    }
}

impl From<[(f64, f64); 2]> for GeoBox {
    fn from([pos0, pos1]: [(f64, f64); 2]) -> Self {
        Self::from_points(pos0, pos1)
    }
}

impl From<(f64, f64, f64, f64)> for GeoBox {
    fn from((lat0, lon0, lat1, lon1): (f64, f64, f64, f64)) -> Self {
        Self::new(lat0, lon0, lat1, lon1)
    }
}

impl From<[f64; 4]> for GeoBox {
    fn from([lat0, lon0, lat1, lon1]: [f64; 4]) -> Self {
        Self::new(lat0, lon0, lat1, lon1)
    }
}

impl fmt::Display for GeoBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.lat0, self.lon0, self.lat1, self.lon1)
    }
}

/// Parses `"lat,lon"` or `"lat0,lon0,lat1,lon1"`
impl FromStr for GeoBox {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(',')
            .map(|part| {
                part.trim().parse::<f64>().map_err(|e| {
                    MapError::InvalidArgument(format!("'{}' is not a number: {}", part.trim(), e))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        canonicalize_box(&values)
    }
}

/// Build a [`GeoBox`] from a flat list of coordinates.
///
/// Two values are a single point, four values are two corners. Any other
/// count is rejected.
pub fn canonicalize_box(values: &[f64]) -> Result<GeoBox> {
    match *values {
        [lat, lon] => Ok(GeoBox::point(lat, lon)),
        [lat0, lon0, lat1, lon1] => Ok(GeoBox::new(lat0, lon0, lat1, lon1)),
        _ => Err(MapError::InvalidArgument(format!(
            "a box needs 2 (point) or 4 (two corners) coordinates, got {}",
            values.len()
        ))),
    }
}

/// Grow a box by a fraction of its size on every side.
///
/// The result is ordered and clamped to ±80° latitude and ±180° longitude.
/// The longitude floor widens with latitude so that tiny boxes keep a
/// similar ground width everywhere. `None` returns `geo_box` untouched.
pub fn extend_box(geo_box: GeoBox, margin: Option<f64>) -> GeoBox {
    let Some(margin) = margin else {
        return geo_box;
    };
    let GeoBox {
        lat0,
        lon0,
        lat1,
        lon1,
    } = geo_box.ordered();

    let dlat = ((lat1 - lat0) * margin).max(MIN_MARGIN_DEG);
    let dlon = ((lon1 - lon0) * margin).max(MIN_MARGIN_DEG / lat0.to_radians().cos());

    GeoBox::new(
        (lat0 - dlat).max(-LAT_LIMIT),
        (lon0 - dlon).max(-LON_LIMIT),
        (lat1 + dlat).min(LAT_LIMIT),
        (lon1 + dlon).min(LON_LIMIT),
    )
}

/// A box of tile indices at one zoom level, corners unordered until clamped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileBox {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl TileBox {
    pub fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Indices of the tiles holding the two corners of `geo_box`, unclamped
    pub fn from_geo(geo_box: &GeoBox, zoom: u8) -> Self {
        let (x0, y0) = deg2tile(geo_box.lat0, geo_box.lon0, zoom, true);
        let (x1, y1) = deg2tile(geo_box.lat1, geo_box.lon1, zoom, true);
        Self::new(x0 as i64, y0 as i64, x1 as i64, y1 as i64)
    }

    /// Sort each axis on its own and clamp to the grid of `zoom`.
    ///
    /// The axes are sorted independently, not as corner pairs, so the result
    /// is the tile-aligned rectangle spanned by both corners.
    /// `zoom` must be below 63.
    pub fn clamp(&self, zoom: u8) -> Self {
        let max = (1i64 << zoom) - 1;
        Self::new(
            self.x0.min(self.x1).clamp(0, max),
            self.y0.min(self.y1).clamp(0, max),
            self.x0.max(self.x1).clamp(0, max),
            self.y0.max(self.y1).clamp(0, max),
        )
    }

    /// Number of tiles along x and y
    pub fn extent(&self) -> (u64, u64) {
        (self.x0.abs_diff(self.x1) + 1, self.y0.abs_diff(self.y1) + 1)
    }

    pub fn tile_count(&self) -> u64 {
        let (sx, sy) = self.extent();
        sx * sy
    }

    /// Top-left tile of the box
    pub fn origin(&self) -> (i64, i64) {
        (self.x0.min(self.x1), self.y0.min(self.y1))
    }

    /// Every `(x, y)` in the box, row by row
    pub fn tiles(&self) -> impl Iterator<Item = (i64, i64)> {
        let (xa, xb) = (self.x0.min(self.x1), self.x0.max(self.x1));
        let (ya, yb) = (self.y0.min(self.y1), self.y0.max(self.y1));
        (ya..=yb).flat_map(move |y| (xa..=xb).map(move |x| (x, y)))
    }
}

impl fmt::Display for TileBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]..[{},{}]", self.x0, self.y0, self.x1, self.y1)
    }
}

/// Free-function form of [`TileBox::clamp`]
pub fn clamp_tile_box(tile_box: TileBox, zoom: u8) -> TileBox {
    tile_box.clamp(zoom)
}

/// Free-function form of [`TileBox::extent`]
pub fn tile_box_extent(tile_box: &TileBox) -> (u64, u64) {
    tile_box.extent()
}

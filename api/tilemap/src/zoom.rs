use crate::bbox::{GeoBox, TileBox};
use log::warn;

/// Highest zoom level served by common raster tile servers
pub const MAX_ZOOM: u8 = 19;

/// Outcome of [`select_zoom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomSelection {
    /// Zoom asked for by the caller, before any capping
    pub requested: u8,
    pub zoom: u8,
}

impl ZoomSelection {
    /// True when the box did not fit at the requested zoom
    pub fn lowered(&self) -> bool {
        self.zoom < self.requested
    }
}

/// Number of tiles needed to cover `geo_box` at `zoom`
pub fn tiles_at_zoom(geo_box: &GeoBox, zoom: u8) -> u64 {
    TileBox::from_geo(geo_box, zoom).clamp(zoom).tile_count()
}

/// Find the highest zoom, starting at `requested` (capped to [`MAX_ZOOM`]),
/// whose tile grid for `geo_box` holds fewer than `maxtiles` tiles.
///
/// Zoom 0 is a single tile, so the search always ends there at the latest,
/// even when `maxtiles` is so small that nothing fits. Any result below
/// `requested`, the cap included, counts as lowered.
pub fn select_zoom(geo_box: &GeoBox, requested: u8, maxtiles: u32) -> ZoomSelection {
    let zoom = (0..=requested.min(MAX_ZOOM))
        .rev()
        .find(|&z| tiles_at_zoom(geo_box, z) < u64::from(maxtiles))
        .unwrap_or(0);

    let selection = ZoomSelection { requested, zoom };
    if selection.lowered() {
        warn!(
            "Lowered zoom level from {} to {} to keep the map under {} tiles",
            requested, zoom, maxtiles
        );
    }
    selection
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: GeoBox = GeoBox {
        lat0: 51.49,
        lon0: -0.13,
        lat1: 51.52,
        lon1: -0.09,
    };

    #[test]
    fn test_small_box_keeps_zoom() {
        let point = GeoBox::point(48.8566, 2.3522);
        let s = select_zoom(&point, 18, 16);
        assert_eq!(s.zoom, 18);
        assert!(!s.lowered());
    }

    #[test]
    fn test_london_lowers_zoom() {
        let s = select_zoom(&LONDON, 16, 16);
        assert!(s.lowered());
        assert_eq!(s.requested, 16);
        assert!(tiles_at_zoom(&LONDON, s.zoom) < 16);
        // the next zoom up would not have fit
        assert!(tiles_at_zoom(&LONDON, s.zoom + 1) >= 16);
    }

    #[test]
    fn test_maxtiles_one_selects_zero() {
        for geo in [LONDON, GeoBox::point(10.0, 10.0), GeoBox::new(-80.0, -180.0, 80.0, 180.0)] {
            assert_eq!(select_zoom(&geo, 18, 1).zoom, 0);
        }
    }

    #[test]
    fn test_requested_zoom_is_capped() {
        let s = select_zoom(&GeoBox::point(0.0, 0.0), 25, 16);
        assert_eq!(s.requested, 25);
        assert_eq!(s.zoom, MAX_ZOOM);
        assert!(s.lowered());

        let s = select_zoom(&GeoBox::point(0.0, 0.0), MAX_ZOOM, 16);
        assert!(!s.lowered());
    }

    #[test]
    fn test_zoom_zero_request() {
        let s = select_zoom(&LONDON, 0, 16);
        assert_eq!(s, ZoomSelection { requested: 0, zoom: 0 });
    }
}

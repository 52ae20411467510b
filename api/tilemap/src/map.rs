use crate::assemble::assemble;
use crate::bbox::{extend_box, GeoBox, TileBox};
use crate::config::MapConfig;
use crate::coords::{meters_per_pixel, pixel_from_point, pixels_from_points};
use crate::error::Result;
use crate::fetch::{HttpTileFetcher, TileFetcher, TileUrlTemplate};
use crate::zoom::select_zoom;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageOutputFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use log::info;
use std::io::Cursor;
use std::path::Path;

/// A composite map image covering a geographic box
pub struct Map {
    geo_box: GeoBox,
    requested_zoom: u8,
    zoom: u8,
    tile_box: TileBox,
    origin: (i64, i64),
    tilesize: u32,
    image: DynamicImage,
}

impl Map {
    /// Build a map, downloading tiles from `config.tileserver`
    pub fn new(geo_box: impl Into<GeoBox>, config: &MapConfig) -> Result<Self> {
        let fetcher = HttpTileFetcher::new(TileUrlTemplate::new(config.tileserver.as_str()))?
            .verbose(config.verbose);
        Self::with_fetcher(geo_box, config, &fetcher)
    }

    /// Build a map with tiles from any [`TileFetcher`]
    pub fn with_fetcher<F>(geo_box: impl Into<GeoBox>, config: &MapConfig, fetcher: &F) -> Result<Self>
    where
        F: TileFetcher + ?Sized,
    {
        let geo_box = extend_box(geo_box.into(), config.margin);
        let selection = select_zoom(&geo_box, config.zoom, config.maxtiles);
        let zoom = selection.zoom;
        let tile_box = TileBox::from_geo(&geo_box, zoom).clamp(zoom);

        if config.verbose {
            let (sx, sy) = tile_box.extent();
            info!("Fetching {}x{} tiles at zoom {} for box {}", sx, sy, zoom, geo_box);
        }
        let image = assemble(tile_box, zoom, fetcher, config.tilesize, config.maxtiles, config.tms)?;
        if config.verbose {
            info!("Map ready: {}x{} px", image.width(), image.height());
        }

        Ok(Self {
            geo_box,
            requested_zoom: selection.requested,
            zoom,
            tile_box,
            origin: tile_box.origin(),
            tilesize: config.tilesize,
            image,
        })
    }

    /// The box after margin extension
    pub fn geo_box(&self) -> &GeoBox {
        &self.geo_box
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn requested_zoom(&self) -> u8 {
        self.requested_zoom
    }

    pub fn tile_box(&self) -> &TileBox {
        &self.tile_box
    }

    /// Tile shown in the top-left corner of the image
    pub fn origin(&self) -> (i64, i64) {
        self.origin
    }

    pub fn tilesize(&self) -> u32 {
        self.tilesize
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Pixel position of a lat/lon point on the map image
    pub fn to_pixels(&self, lat: f64, lon: f64) -> (f64, f64) {
        pixel_from_point(lat, lon, self.zoom, self.origin, self.tilesize)
    }

    /// Pixel positions of many points, in input order
    pub fn to_pixels_many(&self, points: &[(f64, f64)]) -> Vec<(f64, f64)> {
        pixels_from_points(points, self.zoom, self.origin, self.tilesize)
    }

    /// Ground resolution at the centre of the box
    pub fn meters_per_pixel(&self) -> f64 {
        meters_per_pixel(self.geo_box.center_lat().to_radians(), self.zoom)
    }

    /// Raw RGBA bytes, row-major, with the image width and height
    pub fn to_rgba_array(&self) -> (u32, u32, Vec<u8>) {
        let rgba = self.image.to_rgba8();
        (rgba.width(), rgba.height(), rgba.into_raw())
    }

    /// Raw RGB bytes with alpha dropped, row-major, with the image width and height
    pub fn to_rgb_array(&self) -> (u32, u32, Vec<u8>) {
        let rgb = self.image.to_rgb8();
        (rgb.width(), rgb.height(), rgb.into_raw())
    }

    /// Encode the map as PNG
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.image.write_to(&mut buffer, ImageOutputFormat::Png)?;
        Ok(buffer.into_inner())
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.image.save_with_format(path, ImageFormat::Png)?;
        if let Some(name) = path.file_name() {
            info!("Saved map to {:?}", name);
        }
        Ok(())
    }

    /// Copy of the map with a filled circle drawn at each lat/lon point.
    ///
    /// Points outside the image are skipped by the drawing routine.
    pub fn overlay_points(&self, points: &[(f64, f64)], color: Rgba<u8>, radius: u32) -> RgbaImage {
        let mut canvas = self.image.to_rgba8();
        for (px, py) in self.to_pixels_many(points) {
            let center = (px.round() as i32, py.round() as i32);
            draw_filled_circle_mut(&mut canvas, center, radius as i32, color);
        }
        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::tile2deg;
    use crate::error::{FetchError, MapError};
    use approx::assert_abs_diff_eq;

    fn gray_tile(size: u32) -> std::result::Result<DynamicImage, FetchError> {
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            size,
            size,
            Rgba([200, 200, 200, 255]),
        )))
    }

    fn london(config: &MapConfig) -> Map {
        let fetcher = |_x: u32, _y: u32, _z: u8| gray_tile(config.tilesize);
        Map::with_fetcher((51.49, -0.13, 51.52, -0.09), config, &fetcher).unwrap()
    }

    #[test]
    fn test_map_london_dimensions() {
        let config = MapConfig::default().with_zoom(16).with_margin(None).with_verbose(false);
        let map = london(&config);
        assert_eq!(map.requested_zoom(), 16);
        assert_eq!(map.zoom(), 14);
        let (sx, sy) = map.tile_box().extent();
        assert!(sx * sy < 16);
        assert_eq!(map.width(), sx as u32 * 256);
        assert_eq!(map.height(), sy as u32 * 256);
    }

    #[test]
    fn test_map_keeps_requested_zoom_above_max() {
        let config = MapConfig::default()
            .with_zoom(25)
            .with_margin(None)
            .with_verbose(false);
        let fetcher = |_x: u32, _y: u32, _z: u8| gray_tile(config.tilesize);
        let map = Map::with_fetcher(GeoBox::point(48.8566, 2.3522), &config, &fetcher).unwrap();
        assert_eq!(map.requested_zoom(), 25);
        assert_eq!(map.zoom(), 19);
    }

    #[test]
    fn test_map_origin_maps_to_zero() {
        let config = MapConfig::default().with_zoom(16).with_verbose(false);
        let map = london(&config);
        let (x, y) = map.origin();
        let (lat, lon) = tile2deg(x as f64, y as f64, map.zoom());
        let (px, py) = map.to_pixels(lat, lon);
        assert_abs_diff_eq!(px, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(py, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_map_box_points_inside_image() {
        let config = MapConfig::default().with_zoom(15).with_verbose(false);
        let map = london(&config);
        let pixels = map.to_pixels_many(&[(51.49, -0.13), (51.52, -0.09)]);
        assert_eq!(pixels.len(), 2);
        for (px, py) in pixels {
            assert!(px >= 0.0 && px < f64::from(map.width()));
            assert!(py >= 0.0 && py < f64::from(map.height()));
        }
    }

    #[test]
    fn test_map_outputs() {
        let config = MapConfig::default()
            .with_zoom(10)
            .with_tilesize(8)
            .with_verbose(false);
        let map = london(&config);

        let (w, h, raw) = map.to_rgba_array();
        assert_eq!((w, h), (map.width(), map.height()));
        assert_eq!(raw.len(), (w * h * 4) as usize);
        assert_eq!(&raw[..4], &[200, 200, 200, 255]);

        let (w3, h3, rgb) = map.to_rgb_array();
        assert_eq!((w3, h3), (w, h));
        assert_eq!(rgb.len(), (w * h * 3) as usize);
        assert_eq!(&rgb[..6], &[200, 200, 200, 200, 200, 200]);

        let png = map.to_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.dimensions(), (w, h));
    }

    #[test]
    fn test_overlay_points() {
        let config = MapConfig::default()
            .with_zoom(10)
            .with_tilesize(16)
            .with_verbose(false);
        let map = london(&config);
        let red = Rgba([255, 0, 0, 255]);
        let overlay = map.overlay_points(&[(51.505, -0.11)], red, 2);
        let (px, py) = map.to_pixels(51.505, -0.11);
        assert_eq!(*overlay.get_pixel(px.round() as u32, py.round() as u32), red);
        // the map itself is untouched
        assert_eq!(map.image().get_pixel(px.round() as u32, py.round() as u32), Rgba([200, 200, 200, 255]));
    }

    #[test]
    fn test_meters_per_pixel_scales_with_zoom() {
        let config = MapConfig::default().with_zoom(10).with_verbose(false);
        let coarse = london(&config);
        let fine = london(&config.clone().with_zoom(11));
        assert_abs_diff_eq!(coarse.meters_per_pixel(), fine.meters_per_pixel() * 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_map_fetch_failure_aborts() {
        let config = MapConfig::default().with_zoom(12).with_verbose(false);
        let fetcher = |x: u32, y: u32, _z: u8| -> std::result::Result<DynamicImage, FetchError> {
            Err(FetchError::Status {
                url: format!("test://{}/{}", x, y),
                status: 503,
            })
        };
        let result = Map::with_fetcher(GeoBox::point(48.8566, 2.3522), &config, &fetcher);
        assert!(matches!(result, Err(MapError::Fetch { .. })));
    }
}

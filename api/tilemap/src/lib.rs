//! Stitch slippy-map raster tiles covering a lat/lon box into one image.
//!
//! ```no_run
//! use tilemap::{Map, MapConfig};
//!
//! let config = MapConfig::default().with_zoom(16);
//! let map = Map::new((51.49, -0.13, 51.52, -0.09), &config)?;
//! let (px, py) = map.to_pixels(51.5055, -0.0754);
//! map.save_png(std::path::Path::new("london.png"))?;
//! # Ok::<(), tilemap::MapError>(())
//! ```

pub mod assemble;
pub mod bbox;
pub mod config;
pub mod coords;
pub mod error;
pub mod fetch;
pub mod map;
pub mod zoom;

pub use assemble::assemble;
pub use bbox::{canonicalize_box, clamp_tile_box, extend_box, tile_box_extent, GeoBox, TileBox};
pub use config::MapConfig;
pub use coords::{deg2tile, deg2tile_many, meters_per_pixel, pixel_from_point, pixels_from_points, tile2deg};
pub use error::{FetchError, MapError};
pub use fetch::{HttpTileFetcher, TileFetcher, TileUrlTemplate};
pub use map::Map;
pub use zoom::{select_zoom, ZoomSelection};

use crate::error::Result;
use crate::fetch::DEFAULT_TILE_SERVER;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ZOOM: u8 = 18;
pub const DEFAULT_MARGIN: f64 = 0.05;
pub const DEFAULT_TILE_SIZE: u32 = 256;
/// Hard cap on the number of tiles a single map may download
pub const DEFAULT_MAX_TILES: u32 = 16;

/// Options recognised when building a [`crate::Map`]
///
/// Every field is optional in JSON, missing ones take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Requested zoom level, lowered automatically when the box is too big
    #[serde(alias = "z")]
    pub zoom: u8,
    /// Fraction of the box size added on each side, `None` keeps the box as is
    pub margin: Option<f64>,
    /// Tile URL template with `{z}`, `{x}` and `{y}`
    pub tileserver: String,
    pub tilesize: u32,
    pub maxtiles: u32,
    pub verbose: bool,
    /// Tile server numbers rows from the south (TMS)
    pub tms: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            margin: Some(DEFAULT_MARGIN),
            tileserver: DEFAULT_TILE_SERVER.to_string(),
            tilesize: DEFAULT_TILE_SIZE,
            maxtiles: DEFAULT_MAX_TILES,
            verbose: true,
            tms: false,
        }
    }
}

impl MapConfig {
    /// Load a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_margin(mut self, margin: Option<f64>) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_tileserver(mut self, tileserver: impl Into<String>) -> Self {
        self.tileserver = tileserver.into();
        self
    }

    pub fn with_tilesize(mut self, tilesize: u32) -> Self {
        self.tilesize = tilesize;
        self
    }

    pub fn with_maxtiles(mut self, maxtiles: u32) -> Self {
        self.maxtiles = maxtiles;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_tms(mut self, tms: bool) -> Self {
        self.tms = tms;
        self
    }
}

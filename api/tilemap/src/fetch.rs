use crate::error::{FetchError, Result};
use image::DynamicImage;
use log::{debug, info};
use reqwest::blocking::Client;

/// Tile server used when no template is configured
pub const DEFAULT_TILE_SERVER: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Product identifier sent with every tile request
pub const USER_AGENT: &str = "smopy";

/// Source of decoded raster tiles
pub trait TileFetcher {
    /// Fetch tile `x`/`y` at `zoom`. `y` is the row as the server numbers it.
    fn fetch_tile(&self, x: u32, y: u32, zoom: u8) -> Result<DynamicImage, FetchError>;
}

impl<F> TileFetcher for F
where
    F: Fn(u32, u32, u8) -> Result<DynamicImage, FetchError>,
{
    fn fetch_tile(&self, x: u32, y: u32, zoom: u8) -> Result<DynamicImage, FetchError> {
        self(x, y, zoom)
    }
}

/// URL template with `{z}`, `{x}` and `{y}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileUrlTemplate(String);

impl TileUrlTemplate {
    /// An empty template falls back to [`DEFAULT_TILE_SERVER`]
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        if template.trim().is_empty() {
            Self(DEFAULT_TILE_SERVER.to_string())
        } else {
            Self(template)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn url(&self, x: u32, y: u32, zoom: u8) -> String {
        self.0
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

impl Default for TileUrlTemplate {
    fn default() -> Self {
        Self(DEFAULT_TILE_SERVER.to_string())
    }
}

/// Blocking HTTP tile client
pub struct HttpTileFetcher {
    client: Client,
    template: TileUrlTemplate,
    verbose: bool,
}

impl HttpTileFetcher {
    pub fn new(template: TileUrlTemplate) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            template,
            verbose: false,
        })
    }

    /// Log every downloaded URL at info level instead of debug
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn template(&self) -> &TileUrlTemplate {
        &self.template
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let network = |source| FetchError::Network {
            url: url.to_string(),
            source,
        };
        let resp = self.client.get(url).send().map_err(network)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = resp.bytes().map_err(network)?;
        Ok(bytes.to_vec())
    }
}

impl TileFetcher for HttpTileFetcher {
    fn fetch_tile(&self, x: u32, y: u32, zoom: u8) -> Result<DynamicImage, FetchError> {
        let url = self.template.url(x, y, zoom);
        if self.verbose {
            info!("Downloading {}", url);
        } else {
            debug!("Downloading {}", url);
        }
        let bytes = self.download(&url)?;
        debug!("Received {} bytes from {}", bytes.len(), url);
        Ok(image::load_from_memory(&bytes)?)
    }
}

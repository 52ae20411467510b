use thiserror::Error;

/// Failure while fetching a single tile
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("tile server answered HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("could not decode tile image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("tile is {width}x{height} pixels, expected {expected}x{expected}")]
    TileSize { width: u32, height: u32, expected: u32 },
}

/// Errors returned while building or exporting a map
#[derive(Error, Debug)]
pub enum MapError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(
        "the map would need {tiles} tiles, which exceeds the limit of {maxtiles}. \
         Tile servers have usage policies that forbid bulk downloads, \
         so use a lower zoom level or a smaller box"
    )]
    TileLimitExceeded { tiles: u64, maxtiles: u32 },

    #[error("failed to fetch tile {zoom}/{x}/{y}: {source}")]
    Fetch {
        x: u32,
        y: u32,
        zoom: u8,
        #[source]
        source: FetchError,
    },

    #[error("could not create HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T, E = MapError> = std::result::Result<T, E>;

extern crate pretty_env_logger;
#[macro_use]
extern crate log;

use anyhow::{bail, Context, Result};
use clap::Parser;
use image::Rgba;
use std::path::PathBuf;
use tilemap::{GeoBox, Map, MapConfig};

/// Download the map tiles covering a box and save them as one PNG
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Box as `lat,lon` or `lat0,lon0,lat1,lon1`
    #[arg(allow_hyphen_values = true)]
    geo_box: GeoBox,

    /// Requested zoom level
    #[arg(short, long)]
    zoom: Option<u8>,

    /// Fraction of the box size added on each side
    #[arg(long, conflicts_with = "no_margin")]
    margin: Option<f64>,

    /// Use the box exactly as given
    #[arg(long)]
    no_margin: bool,

    /// Tile URL template with {z}, {x} and {y}
    #[arg(long)]
    tileserver: Option<String>,

    #[arg(long)]
    tilesize: Option<u32>,

    /// Refuse maps needing this many tiles or more
    #[arg(long)]
    maxtiles: Option<u32>,

    /// The tile server numbers rows from the south
    #[arg(long)]
    tms: bool,

    /// Only log warnings and errors from the map builder
    #[arg(short, long)]
    quiet: bool,

    /// JSON file with map options, command line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mark a `lat,lon` point on the saved map (repeatable)
    #[arg(long = "point", allow_hyphen_values = true)]
    points: Vec<GeoBox>,

    #[arg(short, long, default_value = "map.png")]
    output: PathBuf,
}

impl Args {
    fn map_config(&self) -> Result<MapConfig> {
        let mut config = match &self.config {
            Some(path) => MapConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config from {:?}", path))?,
            None => MapConfig::default(),
        };
        if let Some(zoom) = self.zoom {
            config.zoom = zoom;
        }
        if self.no_margin {
            config.margin = None;
        } else if let Some(margin) = self.margin {
            config.margin = Some(margin);
        }
        if let Some(tileserver) = &self.tileserver {
            config.tileserver = tileserver.clone();
        }
        if let Some(tilesize) = self.tilesize {
            config.tilesize = tilesize;
        }
        if let Some(maxtiles) = self.maxtiles {
            config.maxtiles = maxtiles;
        }
        config.tms |= self.tms;
        config.verbose &= !self.quiet;
        Ok(config)
    }

    fn marker_points(&self) -> Result<Vec<(f64, f64)>> {
        self.points
            .iter()
            .map(|p| {
                if p.lat0 != p.lat1 || p.lon0 != p.lon1 {
                    bail!("--point takes a single lat,lon pair, got {}", p);
                }
                Ok((p.lat0, p.lon0))
            })
            .collect()
    }
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = Args::parse();
    let config = args.map_config()?;
    let points = args.marker_points()?;

    info!("Building map for box {} at zoom {}", args.geo_box, config.zoom);
    let map = Map::new(args.geo_box, &config).context("Failed to build map")?;

    info!(
        "Map is {}x{} px at zoom {} ({:.2} m/px)",
        map.width(),
        map.height(),
        map.zoom(),
        map.meters_per_pixel()
    );

    if points.is_empty() {
        map.save_png(&args.output)?;
    } else {
        for (lat, lon) in &points {
            let (px, py) = map.to_pixels(*lat, *lon);
            info!("Point {},{} -> pixel {:.1},{:.1}", lat, lon, px, py);
        }
        map.overlay_points(&points, Rgba([220, 20, 60, 255]), 6)
            .save(&args.output)
            .with_context(|| format!("Failed to save {:?}", args.output))?;
        info!("Saved map with {} markers to {:?}", points.len(), args.output);
    }

    Ok(())
}

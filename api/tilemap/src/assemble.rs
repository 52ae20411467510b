use crate::bbox::TileBox;
use crate::error::{FetchError, MapError, Result};
use crate::fetch::TileFetcher;
use crate::zoom::MAX_ZOOM;
use image::{DynamicImage, GenericImage, GenericImageView};
use log::debug;

/// Row index of tile `y` in the TMS numbering, where row 0 is the south edge.
/// `zoom` must be below 64 and `y` inside its grid.
pub fn tms_row(y: u32, zoom: u8) -> u32 {
    ((1u64 << zoom) - 1 - u64::from(y)) as u32
}

/// Download every tile of `tile_box` and stitch them into one image.
///
/// The box is clamped to the grid first and rejected when it holds
/// `maxtiles` tiles or more. With `flip_rows` the server is asked for the
/// TMS row of each tile while the tile is still pasted at its XYZ position.
/// The first failing tile aborts the whole map. Zooms above [`MAX_ZOOM`]
/// and canvases too large to address are rejected before any download.
pub fn assemble<F>(
    tile_box: TileBox,
    zoom: u8,
    fetcher: &F,
    tilesize: u32,
    maxtiles: u32,
    flip_rows: bool,
) -> Result<DynamicImage>
where
    F: TileFetcher + ?Sized,
{
    if zoom > MAX_ZOOM {
        return Err(MapError::InvalidArgument(format!(
            "zoom {} is above the maximum of {}",
            zoom, MAX_ZOOM
        )));
    }
    let tile_box = tile_box.clamp(zoom);
    let tiles = tile_box.tile_count();
    if tiles >= u64::from(maxtiles) {
        return Err(MapError::TileLimitExceeded { tiles, maxtiles });
    }

    let (sx, sy) = tile_box.extent();
    let (width, height) = canvas_size(sx, sy, tilesize).ok_or_else(|| {
        MapError::InvalidArgument(format!(
            "{}x{} tiles of {} px do not fit in one image",
            sx, sy, tilesize
        ))
    })?;
    let (x0, y0) = tile_box.origin();
    let mut canvas = DynamicImage::new_rgba8(width, height);
    debug!(
        "Assembling {}x{} tiles of {} px at zoom {} ({})",
        sx, sy, tilesize, zoom, tile_box
    );

    for (x, y) in tile_box.tiles() {
        // clamped above, so every index fits the grid of `zoom`
        let (x, y) = (x as u32, y as u32);
        let px = (x - x0 as u32) * tilesize;
        let py = (y - y0 as u32) * tilesize;
        let row = if flip_rows { tms_row(y, zoom) } else { y };

        let tile = fetcher
            .fetch_tile(x, row, zoom)
            .and_then(|tile| check_size(tile, tilesize))
            .map_err(|source| MapError::Fetch {
                x,
                y: row,
                zoom,
                source,
            })?;
        canvas.copy_from(&tile, px, py)?;
    }

    Ok(canvas)
}

/// Pixel size of a `sx` by `sy` tile canvas, `None` when its RGBA buffer
/// cannot be addressed
fn canvas_size(sx: u64, sy: u64, tilesize: u32) -> Option<(u32, u32)> {
    let width = u32::try_from(sx).ok()?.checked_mul(tilesize)?;
    let height = u32::try_from(sy).ok()?.checked_mul(tilesize)?;
    let bytes = u64::from(width)
        .checked_mul(u64::from(height))?
        .checked_mul(4)?;
    usize::try_from(bytes).ok()?;
    Some((width, height))
}

fn check_size(tile: DynamicImage, tilesize: u32) -> Result<DynamicImage, FetchError> {
    let (width, height) = tile.dimensions();
    if width != tilesize || height != tilesize {
        return Err(FetchError::TileSize {
            width,
            height,
            expected: tilesize,
        });
    }
    Ok(tile)
}

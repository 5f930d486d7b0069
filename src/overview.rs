//! Fixed-size decomposition of the base-resolution grid.

use glam::Vec3;

use crate::bounds::Bounds;
use crate::dataset::GridDataset;
use crate::error::Result;
use crate::meta::GridMetadata;
use crate::normals;
use crate::tile::{self, Tile, TileData, TileIndex};

/// Number of tile columns and rows covering the grid.
pub fn tile_grid_extent(meta: &GridMetadata, tile_size: u32) -> (u32, u32) {
    let cols = (meta.ncols + tile_size - 1) / tile_size;
    let rows = (meta.nrows + tile_size - 1) / tile_size;
    (cols, rows)
}

/// Inclusive sample rectangle covered by the tile at `index`:
/// `(row_start, col_start, row_end, col_end)`. The final row/column of tiles
/// is clipped to the grid bound.
pub fn tile_sample_rect(index: TileIndex, meta: &GridMetadata, tile_size: u32) -> (u32, u32, u32, u32) {
    let row_start = index.row * tile_size;
    let row_end = (row_start + tile_size - 1).min(meta.nrows - 1);
    let col_start = index.col * tile_size;
    let col_end = (col_start + tile_size - 1).min(meta.ncols - 1);
    (row_start, col_start, row_end, col_end)
}

/// Read and assemble one overview tile. Returns `Ok(None)` when every sample
/// in the block is the null sentinel; such tiles are discarded, never
/// published.
pub fn load_overview_tile<D: GridDataset>(
    dataset: &D,
    index: TileIndex,
    meta: &GridMetadata,
    tile_size: u32,
) -> Result<Option<Tile>> {
    let (row_start, col_start, row_end, col_end) = tile_sample_rect(index, meta, tile_size);
    let ncols = col_end - col_start + 1;
    let nrows = row_end - row_start + 1;

    let elevations = dataset.read_elevation_block(row_start, col_start, row_end, col_end)?;

    let Some((min_z, max_z)) = tile::non_null_min_max(&elevations) else {
        return Ok(None);
    };

    let dx = meta.dx as f32;
    let dy = meta.dy as f32;

    let mut bounds = Bounds::new();
    bounds.add(Vec3::new(
        col_start as f32 * dx,
        row_start as f32 * dy,
        min_z,
    ));
    bounds.add(Vec3::new(
        (col_end + 1) as f32 * dx,
        (row_end + 1) as f32 * dy,
        max_z,
    ));

    let normal_map = normals::overview_normal_map(&elevations, ncols, nrows, dx, dy);

    Ok(Some(Tile {
        index,
        bounds,
        ncols,
        nrows,
        dx,
        dy,
        lower_left: TileIndex::new(col_start, row_start),
        data: TileData {
            elevations,
            uncertainties: Vec::new(),
            normal_map,
        },
    }))
}

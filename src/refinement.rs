//! Variable-resolution refinement tiles nested inside overview tiles.
//!
//! Each base-grid cell under a surviving overview tile may carry a finer
//! sub-grid, reached through the per-cell metadata record. Cell lookups are
//! independent: a failed or absent cell skips only itself.

use glam::Vec3;
use tracing::debug;

use crate::bounds::Bounds;
use crate::dataset::GridDataset;
use crate::meta::GridMetadata;
use crate::normals;
use crate::tile::{self, Tile, TileData, TileIndex};

/// Look up and assemble the refinement tile for one cell of `parent`,
/// addressed by the tile-relative index `rel`. Returns `None` when the cell
/// is out of range, carries no refinement, fails to read, or holds only null
/// samples.
pub fn load_refinement_tile<D: GridDataset>(
    dataset: &D,
    rel: TileIndex,
    meta: &GridMetadata,
    parent: &Tile,
) -> Option<Tile> {
    let i = parent.lower_left.col + rel.col;
    let j = parent.lower_left.row + rel.row;
    if i >= meta.ncols || j >= meta.nrows {
        return None;
    }

    let desc = match dataset.read_refinement_cell(j, i) {
        Ok(desc) => desc,
        Err(err) => {
            debug!("no refinement metadata at ({}, {}): {}", j, i, err);
            return None;
        }
    };
    if desc.dimensions_x == 0 || desc.dimensions_y == 0 {
        return None;
    }

    let count = desc.dimensions_x.checked_mul(desc.dimensions_y)?;
    let end = desc.index.checked_add(count - 1)?;
    let samples = match dataset.read_refinements(desc.index, end) {
        Ok(samples) => samples,
        Err(err) => {
            debug!("refinement read failed at ({}, {}): {}", j, i, err);
            return None;
        }
    };
    if samples.len() != count as usize {
        debug!(
            "refinement at ({}, {}) returned {} samples, expected {}",
            j,
            i,
            samples.len(),
            count
        );
        return None;
    }

    let mut elevations = Vec::with_capacity(count as usize);
    let mut uncertainties = Vec::with_capacity(count as usize);
    for sample in &samples {
        elevations.push(sample.depth);
        uncertainties.push(sample.uncertainty);
    }

    let (min_z, max_z) = tile::non_null_min_max(&elevations)?;

    let normal_map = normals::refinement_normal_map(
        &elevations,
        desc.dimensions_x,
        desc.dimensions_y,
        desc.resolution_x,
        desc.resolution_y,
    );

    // The cell's nominal center sits at (i*dx, j*dy); the sub-grid anchors at
    // the center minus half a parent cell plus its own sub-corner offset.
    let cx = i as f32 * meta.dx as f32;
    let cy = j as f32 * meta.dy as f32;
    let llx = cx - meta.dx as f32 / 2.0 + desc.sw_corner_x;
    let lly = cy - meta.dy as f32 / 2.0 + desc.sw_corner_y;

    let mut bounds = Bounds::new();
    bounds.add(Vec3::new(llx, lly, min_z));
    bounds.add(Vec3::new(
        llx + (desc.dimensions_x - 1) as f32 * desc.resolution_x,
        lly + (desc.dimensions_y - 1) as f32 * desc.resolution_y,
        max_z,
    ));

    Some(Tile {
        index: rel,
        bounds,
        ncols: desc.dimensions_x,
        nrows: desc.dimensions_y,
        dx: desc.resolution_x,
        dy: desc.resolution_y,
        lower_left: TileIndex::new(i, j),
        data: TileData {
            elevations,
            uncertainties,
            normal_map,
        },
    })
}

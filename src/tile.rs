use std::sync::Arc;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;

/// Reserved elevation value marking "no data" at a sample.
pub const NULL_ELEVATION: f32 = 1_000_000.0;

/// Position of a tile within its decomposition grid, or of a sample within
/// the full grid's index space. Ordering is by `(col, row)`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TileIndex {
    pub col: u32,
    pub row: u32,
}

impl TileIndex {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// Sample buffers owned by one tile.
///
/// `uncertainties` is populated for refinement tiles only; the overview path
/// reads just the elevation layer.
#[derive(Debug, Clone)]
pub struct TileData {
    pub elevations: Vec<f32>,
    pub uncertainties: Vec<f32>,
    pub normal_map: RgbImage,
}

/// One published tile. Created once inside the background worker and never
/// mutated after publication.
#[derive(Debug, Clone)]
pub struct Tile {
    pub index: TileIndex,
    pub bounds: Bounds,
    pub ncols: u32,
    pub nrows: u32,
    pub dx: f32,
    pub dy: f32,
    /// Lower-left sample coordinate in the parent grid's index space.
    pub lower_left: TileIndex,
    pub data: TileData,
}

pub type TilePtr = Arc<Tile>;

/// Min/max over the non-null samples, or `None` if every sample is the null
/// sentinel.
pub(crate) fn non_null_min_max(samples: &[f32]) -> Option<(f32, f32)> {
    let mut min = NULL_ELEVATION;
    let mut max = NULL_ELEVATION;
    for &e in samples {
        if e != NULL_ELEVATION {
            if min == NULL_ELEVATION || e < min {
                min = e;
            }
            if max == NULL_ELEVATION || e > max {
                max = e;
            }
        }
    }
    if min == NULL_ELEVATION {
        None
    } else {
        Some((min, max))
    }
}

//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use bathytile::dataset::memory::MemoryDataset;
use bathytile::dataset::{GridInfo, RefinementSample};
use bathytile::{GridMetadata, NULL_ELEVATION};

pub fn grid_info(ncols: u32, nrows: u32, dx: f64, dy: f64) -> GridInfo {
    GridInfo {
        dx,
        dy,
        ncols,
        nrows,
        ll_corner_x: 0.0,
        ll_corner_y: 0.0,
        min_elevation: 0.0,
        max_elevation: 0.0,
        variable_resolution: false,
    }
}

pub fn metadata(ncols: u32, nrows: u32, dx: f64, dy: f64) -> GridMetadata {
    GridMetadata::from_info(&grid_info(ncols, nrows, dx, dy))
}

/// Dataset where every sample holds `value`.
pub fn flat_dataset(ncols: u32, nrows: u32, dx: f64, dy: f64, value: f32) -> MemoryDataset {
    MemoryDataset::new(
        grid_info(ncols, nrows, dx, dy),
        vec![value; (ncols * nrows) as usize],
    )
}

/// A 300x300 grid, all null except a 10x10 block of zeros in the south-west
/// corner.
pub fn single_block_dataset() -> MemoryDataset {
    let mut dataset = MemoryDataset::empty(grid_info(300, 300, 1.0, 1.0));
    for row in 0..10 {
        for col in 0..10 {
            dataset.set_elevation(row, col, 0.0);
        }
    }
    dataset
}

pub fn samples_from_depths(depths: &[f32], uncertainty: f32) -> Vec<RefinementSample> {
    depths
        .iter()
        .map(|&d| RefinementSample::new(d, uncertainty))
        .collect()
}

/// Shorthand for a constant-depth refinement patch.
pub fn constant_samples(count: usize, depth: f32) -> Vec<RefinementSample> {
    vec![RefinementSample::new(depth, 0.0); count]
}

pub const NULL: f32 = NULL_ELEVATION;

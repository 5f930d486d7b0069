//! Seam to the grid storage backend.
//!
//! The container format itself is owned by whatever implements these traits;
//! the loader only needs scalar metadata, bulk elevation reads, and the
//! variable-resolution metadata/refinement lookups.

pub mod layout;
pub mod memory;

pub use layout::{RefinementDescriptor, RefinementSample};

use std::path::Path;

use crate::error::Result;

/// Scalar metadata exposed by an opened dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridInfo {
    /// Column resolution (world units per sample along x).
    pub dx: f64,
    /// Row resolution (world units per sample along y).
    pub dy: f64,
    pub ncols: u32,
    pub nrows: u32,
    pub ll_corner_x: f64,
    pub ll_corner_y: f64,
    pub min_elevation: f32,
    pub max_elevation: f32,
    /// Whether the dataset carries a nested variable-resolution layer.
    pub variable_resolution: bool,
}

/// Opens datasets by path. Moved into the background worker, which owns the
/// datasets it opens for the duration of one load.
pub trait GridProvider: Send + 'static {
    type Dataset: GridDataset;

    fn open(&self, path: &Path) -> Result<Self::Dataset>;
}

/// One opened, read-only dataset.
pub trait GridDataset {
    fn info(&self) -> GridInfo;

    /// Bulk elevation read over an inclusive row/column rectangle, row-major.
    fn read_elevation_block(
        &self,
        row_start: u32,
        col_start: u32,
        row_end: u32,
        col_end: u32,
    ) -> Result<Vec<f32>>;

    /// Variable-resolution metadata for one base-grid cell. Absent cells
    /// surface as a size-mismatch error.
    fn read_refinement_cell(&self, row: u32, col: u32) -> Result<RefinementDescriptor>;

    /// Inclusive range of the flat refinement sample array.
    fn read_refinements(&self, start: u32, end: u32) -> Result<Vec<RefinementSample>>;
}

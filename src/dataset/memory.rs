//! In-memory grid backend.
//!
//! Stand-in for a real container reader, in the same spirit as a dummy
//! hardware backend: datasets are registered under path keys and served from
//! RAM. Variable-resolution records are stored as encoded bytes so reads go
//! through the same layout decoder a file-backed reader would use. An
//! optional per-block read delay lets tests exercise restart preemption.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::layout::{self, RefinementDescriptor, RefinementSample, DESCRIPTOR_RECORD_LEN};
use super::{GridDataset, GridInfo, GridProvider};
use crate::error::{
    Error, OpenError, ReadRangeError, RefinementReadError, Result, SizeMismatchError,
};
use crate::tile::NULL_ELEVATION;

#[derive(Debug, Clone, Default)]
pub struct MemoryDataset {
    info: GridInfo,
    elevations: Arc<Vec<f32>>,
    /// Encoded descriptor records, row-major, one per base-grid cell.
    vr_cells: Arc<Vec<u8>>,
    /// Encoded refinement sample records.
    vr_samples: Arc<Vec<u8>>,
    /// Cells forced to fail their metadata read.
    poisoned: Arc<HashSet<(u32, u32)>>,
    read_delay: Duration,
}

impl MemoryDataset {
    /// Build a dataset from a row-major elevation buffer of
    /// `ncols * nrows` samples.
    pub fn new(info: GridInfo, elevations: Vec<f32>) -> Self {
        debug_assert_eq!(elevations.len(), (info.ncols * info.nrows) as usize);
        Self {
            info,
            elevations: Arc::new(elevations),
            ..Default::default()
        }
    }

    /// All-null dataset of the given shape.
    pub fn empty(info: GridInfo) -> Self {
        let len = (info.ncols * info.nrows) as usize;
        Self::new(info, vec![NULL_ELEVATION; len])
    }

    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub fn set_elevation(&mut self, row: u32, col: u32, value: f32) {
        let idx = (row * self.info.ncols + col) as usize;
        Arc::make_mut(&mut self.elevations)[idx] = value;
    }

    /// Attach a refinement sub-grid to base cell `(row, col)`. Samples are
    /// appended to the flat array and the descriptor's base index is derived
    /// from the current array length. Marks the dataset variable-resolution.
    pub fn add_refinement(
        &mut self,
        row: u32,
        col: u32,
        dimensions: (u32, u32),
        resolution: (f32, f32),
        sw_corner: (f32, f32),
        samples: &[RefinementSample],
    ) {
        debug_assert_eq!(
            samples.len(),
            (dimensions.0 * dimensions.1) as usize,
            "sample count must match the sub-grid shape"
        );
        let index = (self.vr_samples.len() / layout::SAMPLE_RECORD_LEN) as u32;
        let buf = Arc::make_mut(&mut self.vr_samples);
        for sample in samples {
            buf.extend_from_slice(&sample.encode());
        }
        self.set_descriptor(
            row,
            col,
            RefinementDescriptor {
                index,
                dimensions_x: dimensions.0,
                dimensions_y: dimensions.1,
                resolution_x: resolution.0,
                resolution_y: resolution.1,
                sw_corner_x: sw_corner.0,
                sw_corner_y: sw_corner.1,
            },
        );
    }

    /// Write a raw descriptor record without touching the sample array.
    pub fn set_descriptor(&mut self, row: u32, col: u32, descriptor: RefinementDescriptor) {
        self.ensure_vr_cells();
        let offset = (row * self.info.ncols + col) as usize * DESCRIPTOR_RECORD_LEN;
        let cells = Arc::make_mut(&mut self.vr_cells);
        cells[offset..offset + DESCRIPTOR_RECORD_LEN].copy_from_slice(&descriptor.encode());
        self.info.variable_resolution = true;
    }

    /// Force the metadata read of one cell to fail with a size mismatch.
    pub fn poison_refinement_cell(&mut self, row: u32, col: u32) {
        self.ensure_vr_cells();
        Arc::make_mut(&mut self.poisoned).insert((row, col));
    }

    fn ensure_vr_cells(&mut self) {
        if self.vr_cells.is_empty() {
            let len = (self.info.ncols * self.info.nrows) as usize * DESCRIPTOR_RECORD_LEN;
            self.vr_cells = Arc::new(vec![0u8; len]);
        }
    }
}

impl GridDataset for MemoryDataset {
    fn info(&self) -> GridInfo {
        self.info
    }

    fn read_elevation_block(
        &self,
        row_start: u32,
        col_start: u32,
        row_end: u32,
        col_end: u32,
    ) -> Result<Vec<f32>> {
        if !self.read_delay.is_zero() {
            std::thread::sleep(self.read_delay);
        }
        if row_end >= self.info.nrows
            || col_end >= self.info.ncols
            || row_start > row_end
            || col_start > col_end
        {
            return Err(Error::ReadRangeError(ReadRangeError {
                row_start,
                col_start,
                row_end,
                col_end,
            }));
        }
        let width = (col_end - col_start + 1) as usize;
        let mut block = Vec::with_capacity((row_end - row_start + 1) as usize * width);
        for row in row_start..=row_end {
            let offset = (row * self.info.ncols + col_start) as usize;
            block.extend_from_slice(&self.elevations[offset..offset + width]);
        }
        Ok(block)
    }

    fn read_refinement_cell(&self, row: u32, col: u32) -> Result<RefinementDescriptor> {
        let absent = Error::SizeMismatchError(SizeMismatchError {
            expected: DESCRIPTOR_RECORD_LEN,
            actual: 0,
        });
        if self.vr_cells.is_empty() || row >= self.info.nrows || col >= self.info.ncols {
            return Err(absent);
        }
        if self.poisoned.contains(&(row, col)) {
            return Err(absent);
        }
        let offset = (row * self.info.ncols + col) as usize * DESCRIPTOR_RECORD_LEN;
        RefinementDescriptor::decode(&self.vr_cells[offset..offset + DESCRIPTOR_RECORD_LEN])
    }

    fn read_refinements(&self, start: u32, end: u32) -> Result<Vec<RefinementSample>> {
        let total = self.vr_samples.len() / layout::SAMPLE_RECORD_LEN;
        if start > end || end as usize >= total {
            return Err(Error::RefinementReadError(RefinementReadError {
                start,
                end,
            }));
        }
        let from = start as usize * layout::SAMPLE_RECORD_LEN;
        let to = (end as usize + 1) * layout::SAMPLE_RECORD_LEN;
        layout::decode_samples(&self.vr_samples[from..to])
    }
}

/// Path-keyed registry of in-memory datasets.
#[derive(Debug, Default)]
pub struct MemoryGridProvider {
    datasets: HashMap<PathBuf, MemoryDataset>,
}

impl MemoryGridProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, dataset: MemoryDataset) {
        self.datasets.insert(path.into(), dataset);
    }
}

impl GridProvider for MemoryGridProvider {
    type Dataset = MemoryDataset;

    fn open(&self, path: &Path) -> Result<Self::Dataset> {
        self.datasets.get(path).cloned().ok_or_else(|| {
            Error::OpenError(OpenError {
                path: path.to_path_buf(),
                reason: "no dataset registered under this path".to_string(),
            })
        })
    }
}

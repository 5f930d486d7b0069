use glam::Vec3;

use crate::dataset::GridInfo;

/// Immutable snapshot of an opened dataset's scalar metadata.
///
/// Built once per successful open and replaced wholesale on the next one;
/// the default value stands in until the first load completes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridMetadata {
    pub dx: f64,
    pub dy: f64,
    pub ncols: u32,
    pub nrows: u32,
    pub min_elevation: f32,
    pub max_elevation: f32,
    /// World-space extent: `(dx * ncols, dy * nrows, max - min)`.
    pub size: Vec3,
    /// South-west corner at the minimum elevation.
    pub sw_bottom_corner: Vec3,
    pub variable_resolution: bool,
}

impl GridMetadata {
    pub fn from_info(info: &GridInfo) -> Self {
        Self {
            dx: info.dx,
            dy: info.dy,
            ncols: info.ncols,
            nrows: info.nrows,
            min_elevation: info.min_elevation,
            max_elevation: info.max_elevation,
            size: Vec3::new(
                (info.dx * info.ncols as f64) as f32,
                (info.dy * info.nrows as f64) as f32,
                info.max_elevation - info.min_elevation,
            ),
            sw_bottom_corner: Vec3::new(
                info.ll_corner_x as f32,
                info.ll_corner_y as f32,
                info.min_elevation,
            ),
            variable_resolution: info.variable_resolution,
        }
    }
}

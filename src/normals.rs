//! Per-sample surface normals derived from elevation grids.
//!
//! Normals come from the cross product of the forward-difference edge
//! vectors and are packed into an RGB image, one pixel per sample, with each
//! component mapped from `[-1, 1]` to a byte as `127 + 128 * c`.

use glam::Vec3;
use image::{Rgb, RgbImage};

use crate::tile::NULL_ELEVATION;

/// Color written wherever a normal cannot be derived: straight up.
pub const FLAT_NORMAL: Rgb<u8> = Rgb([127, 127, 255]);

fn encode(n: Vec3) -> Rgb<u8> {
    let byte = |c: f32| (127.0 + 128.0 * c).clamp(0.0, 255.0) as u8;
    Rgb([byte(n.x), byte(n.y), byte(n.z)])
}

/// Normal of the facet spanned by `p00 -> p10` along x and `p00 -> p01`
/// along y, or `None` if any tap is the null sentinel.
fn facet_normal(p00: f32, p10: f32, p01: f32, dx: f32, dy: f32) -> Option<Rgb<u8>> {
    if p00 == NULL_ELEVATION || p10 == NULL_ELEVATION || p01 == NULL_ELEVATION {
        return None;
    }
    let v1 = Vec3::new(dx, 0.0, p10 - p00);
    let v2 = Vec3::new(0.0, dy, p01 - p00);
    Some(encode(v1.cross(v2).normalize_or_zero()))
}

/// Normal map for an overview elevation block.
///
/// Forward differences everywhere; at the last column/row the missing tap
/// falls back to the sample itself, flattening the facet along that axis.
pub fn overview_normal_map(
    elevations: &[f32],
    ncols: u32,
    nrows: u32,
    dx: f32,
    dy: f32,
) -> RgbImage {
    let mut map = RgbImage::new(ncols, nrows);
    for ti in 0..nrows {
        for tj in 0..ncols {
            let p00 = elevations[(ti * ncols + tj) as usize];
            let p10 = if tj + 1 < ncols {
                elevations[(ti * ncols + tj + 1) as usize]
            } else {
                p00
            };
            let p01 = if ti + 1 < nrows {
                elevations[((ti + 1) * ncols + tj) as usize]
            } else {
                p00
            };
            let pixel = facet_normal(p00, p10, p01, dx, dy).unwrap_or(FLAT_NORMAL);
            map.put_pixel(tj, ti, pixel);
        }
    }
    map
}

/// Normal map for a refinement sub-grid.
///
/// Interior samples use the same facet normals as the overview path; the
/// last column repeats the column before it and the last row repeats the row
/// beneath it. The scan order guarantees the repeated pixel is already
/// written. A sub-grid only one sample wide or tall has no pixel to repeat
/// and gets the flat-up color instead.
pub fn refinement_normal_map(
    elevations: &[f32],
    ncols: u32,
    nrows: u32,
    dx: f32,
    dy: f32,
) -> RgbImage {
    let mut map = RgbImage::new(ncols, nrows);
    for ti in 0..nrows {
        for tj in 0..ncols {
            let pixel = if ti + 1 < nrows {
                if tj + 1 < ncols {
                    let p00 = elevations[(ti * ncols + tj) as usize];
                    let p10 = elevations[(ti * ncols + tj + 1) as usize];
                    let p01 = elevations[((ti + 1) * ncols + tj) as usize];
                    facet_normal(p00, p10, p01, dx, dy).unwrap_or(FLAT_NORMAL)
                } else if tj > 0 {
                    *map.get_pixel(tj - 1, ti)
                } else {
                    FLAT_NORMAL
                }
            } else if ti > 0 {
                *map.get_pixel(tj, ti - 1)
            } else {
                FLAT_NORMAL
            };
            map.put_pixel(tj, ti, pixel);
        }
    }
    map
}

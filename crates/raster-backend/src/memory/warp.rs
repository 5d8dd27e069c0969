//! Pure-Rust warp: reproject and resample a dataset onto a new grid.
//!
//! Every output pixel center is mapped back to the source:
//!
//! ```text
//! output pixel ──► target CRS coords ──► source CRS coords ──► source pixel
//! ```
//!
//! and sampled with the requested method. Output pixels that land outside the
//! source get the fill value.

use raster_common::crs::CrsTransformer;
use raster_common::{BackendOp, BoundingBox, GeoTransform, RasterError, RasterResult};
use rayon::prelude::*;

use super::dataset::MemDataset;
use crate::options::{Resampling, WarpOptions};

/// Value written where the output has no source data.
pub const FILL_VALUE: f64 = 0.0;

/// Largest output dimension a warp may produce.
const MAX_WARP_DIMENSION: usize = 32_768;

fn warp_err(msg: impl Into<String>) -> RasterError {
    RasterError::backend(BackendOp::Warp, msg)
}

/// Warp `src` according to `options`.
pub fn warp_dataset(src: &MemDataset, options: &WarpOptions) -> RasterResult<MemDataset> {
    let source_crs = options.source_crs.unwrap_or_else(|| src.crs());
    let target_crs = options.target_crs.unwrap_or(source_crs);

    let src_gt = src.geotransform();
    let src_bounds = src_gt.bounds(src.width(), src.height());

    let forward = CrsTransformer::new(source_crs, target_crs).map_err(|e| warp_err(e.to_string()))?;
    let src_bounds_target = forward
        .transform_bbox(&src_bounds)
        .ok_or_else(|| warp_err(format!("source bounds cannot be expressed in {}", target_crs)))?;

    let extent = match options.extent {
        Some(extent) => {
            if !extent.is_valid() {
                return Err(warp_err(format!("invalid target extent {:?}", extent.to_array())));
            }
            let extent_crs = options.extent_crs.unwrap_or(target_crs);
            let extent = CrsTransformer::new(extent_crs, target_crs)
                .map_err(|e| warp_err(e.to_string()))?
                .transform_bbox(&extent)
                .ok_or_else(|| warp_err(format!("target extent cannot be expressed in {}", target_crs)))?;
            if !extent.intersects(&src_bounds_target) {
                return Err(warp_err(format!(
                    "target extent {:?} does not intersect source bounds {:?}",
                    extent.to_array(),
                    src_bounds_target.to_array()
                )));
            }
            extent
        }
        None => src_bounds_target,
    };

    let (width, height) = output_size(src, &src_bounds_target, &extent, options.target_size)?;
    let out_gt = GeoTransform::from_bbox(&extent, width, height);

    let inverse = CrsTransformer::new(target_crs, source_crs).map_err(|e| warp_err(e.to_string()))?;
    let coords = source_pixel_coords(&inverse, &out_gt, &src_gt, width, height);

    let bands = src
        .bands()
        .iter()
        .map(|band| resample_band(band, src.width(), src.height(), &coords, width, options.resampling))
        .collect();

    MemDataset::new(width, height, bands, out_gt, target_crs)
}

/// Output size: the requested size, or the source resolution carried over to `extent`.
fn output_size(
    src: &MemDataset,
    src_bounds_target: &BoundingBox,
    extent: &BoundingBox,
    requested: Option<(usize, usize)>,
) -> RasterResult<(usize, usize)> {
    let (width, height) = match requested {
        Some(size) => size,
        None => {
            let res_x = src_bounds_target.width() / src.width() as f64;
            let res_y = src_bounds_target.height() / src.height() as f64;
            if !(res_x > 0.0 && res_y > 0.0) {
                return Err(warp_err("cannot derive output resolution from source"));
            }
            (
                ((extent.width() / res_x).round() as usize).max(1),
                ((extent.height() / res_y).round() as usize).max(1),
            )
        }
    };

    if width == 0 || height == 0 || width > MAX_WARP_DIMENSION || height > MAX_WARP_DIMENSION {
        return Err(warp_err(format!("invalid output size {}x{}", width, height)));
    }
    Ok((width, height))
}

/// Fractional source pixel position for every output pixel center, row-major.
/// Unmappable pixels get NaN.
fn source_pixel_coords(
    inverse: &CrsTransformer,
    out_gt: &GeoTransform,
    src_gt: &GeoTransform,
    width: usize,
    height: usize,
) -> Vec<(f64, f64)> {
    let mut coords = vec![(f64::NAN, f64::NAN); width * height];

    match inverse.closed_form() {
        Some(closed) => {
            let (out_gt, src_gt) = (*out_gt, *src_gt);
            coords.par_chunks_mut(width).enumerate().for_each(|(row, line)| {
                for (col, slot) in line.iter_mut().enumerate() {
                    let (x, y) = out_gt.pixel_to_geo(col as f64 + 0.5, row as f64 + 0.5);
                    let (sx, sy) = closed.apply(x, y);
                    *slot = src_gt.geo_to_pixel(sx, sy);
                }
            });
        }
        None => {
            for (row, line) in coords.chunks_mut(width).enumerate() {
                for (col, slot) in line.iter_mut().enumerate() {
                    let (x, y) = out_gt.pixel_to_geo(col as f64 + 0.5, row as f64 + 0.5);
                    if let Some((sx, sy)) = inverse.transform(x, y) {
                        *slot = src_gt.geo_to_pixel(sx, sy);
                    }
                }
            }
        }
    }

    coords
}

fn resample_band(
    band: &[f64],
    src_width: usize,
    src_height: usize,
    coords: &[(f64, f64)],
    out_width: usize,
    method: Resampling,
) -> Vec<f64> {
    let mut out = vec![FILL_VALUE; coords.len()];
    out.par_chunks_mut(out_width)
        .zip(coords.par_chunks(out_width))
        .for_each(|(line, line_coords)| {
            for (value, &(px, py)) in line.iter_mut().zip(line_coords) {
                *value = match method {
                    Resampling::Nearest => sample_nearest(band, src_width, src_height, px, py),
                    Resampling::Bilinear => sample_bilinear(band, src_width, src_height, px, py),
                };
            }
        });
    out
}

fn inside(width: usize, height: usize, px: f64, py: f64) -> bool {
    px.is_finite() && py.is_finite() && px >= 0.0 && py >= 0.0 && px < width as f64 && py < height as f64
}

/// Value of the pixel containing `(px, py)`.
pub fn sample_nearest(data: &[f64], width: usize, height: usize, px: f64, py: f64) -> f64 {
    if !inside(width, height, px, py) {
        return FILL_VALUE;
    }
    let col = (px.floor() as usize).min(width - 1);
    let row = (py.floor() as usize).min(height - 1);
    data[row * width + col]
}

/// Bilinear interpolation between the four nearest pixel centers.
///
/// Edge pixels are clamped. A NaN in any corner gives NaN.
pub fn sample_bilinear(data: &[f64], width: usize, height: usize, px: f64, py: f64) -> f64 {
    if !inside(width, height, px, py) {
        return FILL_VALUE;
    }

    // pixel centers sit at +0.5
    let fx = (px - 0.5).max(0.0);
    let fy = (py - 0.5).max(0.0);
    let x0 = (fx.floor() as usize).min(width - 1);
    let y0 = (fy.floor() as usize).min(height - 1);
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let xf = (fx - x0 as f64).clamp(0.0, 1.0);
    let yf = (fy - y0 as f64).clamp(0.0, 1.0);

    let v00 = data[y0 * width + x0];
    let v10 = data[y0 * width + x1];
    let v01 = data[y1 * width + x0];
    let v11 = data[y1 * width + x1];

    if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
        return f64::NAN;
    }

    let top = v00 * (1.0 - xf) + v10 * xf;
    let bottom = v01 * (1.0 - xf) + v11 * xf;
    top * (1.0 - yf) + bottom * yf
}

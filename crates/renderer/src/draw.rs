//! Drawers: turn raw band samples into pixel buffers.

use image::{GrayImage, ImageBuffer, RgbImage, RgbaImage};
use raster_common::{RasterError, RasterResult, ValueRange};
use raster_style::ColorMap;
use rayon::prelude::*;

fn check_samples(samples: &[f64], width: usize, height: usize) -> RasterResult<()> {
    if width == 0 || height == 0 || samples.len() != width * height {
        return Err(RasterError::InvalidSize {
            width: width as u32,
            height: height as u32,
            reason: format!("{} samples do not fill the image", samples.len()),
        });
    }
    Ok(())
}

fn buffer_err(width: usize, height: usize) -> RasterError {
    RasterError::InvalidSize {
        width: width as u32,
        height: height as u32,
        reason: "pixel buffer does not match image size".to_string(),
    }
}

/// Scale a sample from `range` into a byte.
///
/// `(v - min) / (max - min) * 255`, truncated. Values outside the range are
/// clamped, NaN and an empty range give 0.
#[inline]
pub fn normalize_byte(value: f64, range: ValueRange) -> u8 {
    let span = range.span();
    if value.is_nan() || span == 0.0 || !span.is_finite() {
        return 0;
    }
    ((value - range.min) / span * 255.0).clamp(0.0, 255.0) as u8
}

/// Cast a sample to a byte, saturating at 0 and 255. NaN gives 0.
#[inline]
pub fn saturate_byte(value: f64) -> u8 {
    value as u8
}

/// Draw a single band as 8-bit grayscale.
pub fn draw_grayscale(samples: &[f64], width: usize, height: usize, range: ValueRange) -> RasterResult<GrayImage> {
    check_samples(samples, width, height)?;

    let mut pixels = vec![0u8; width * height];
    pixels
        .par_chunks_mut(width)
        .zip(samples.par_chunks(width))
        .for_each(|(row, values)| {
            for (pixel, &v) in row.iter_mut().zip(values) {
                *pixel = normalize_byte(v, range);
            }
        });

    ImageBuffer::from_raw(width as u32, height as u32, pixels).ok_or_else(|| buffer_err(width, height))
}

/// Draw a single band through a color map as RGBA.
pub fn draw_color_map(samples: &[f64], width: usize, height: usize, color_map: &ColorMap) -> RasterResult<RgbaImage> {
    check_samples(samples, width, height)?;

    let mut pixels = vec![0u8; width * height * 4];
    pixels
        .par_chunks_mut(width * 4)
        .zip(samples.par_chunks(width))
        .for_each(|(row, values)| {
            for (pixel, &v) in row.chunks_exact_mut(4).zip(values) {
                pixel.copy_from_slice(&color_map.evaluate(v).to_array());
            }
        });

    ImageBuffer::from_raw(width as u32, height as u32, pixels).ok_or_else(|| buffer_err(width, height))
}

/// Draw three bands as RGB, each sample cast straight to a byte.
pub fn draw_rgb(bands: [&[f64]; 3], width: usize, height: usize) -> RasterResult<RgbImage> {
    for band in bands {
        check_samples(band, width, height)?;
    }
    let [r, g, b] = bands;

    let mut pixels = vec![0u8; width * height * 3];
    pixels.par_chunks_mut(width * 3).enumerate().for_each(|(y, row)| {
        let start = y * width;
        for (x, pixel) in row.chunks_exact_mut(3).enumerate() {
            let i = start + x;
            pixel[0] = saturate_byte(r[i]);
            pixel[1] = saturate_byte(g[i]);
            pixel[2] = saturate_byte(b[i]);
        }
    });

    ImageBuffer::from_raw(width as u32, height as u32, pixels).ok_or_else(|| buffer_err(width, height))
}

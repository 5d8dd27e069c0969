//! Bounding box to pixel window resolution.

use raster_common::{BoundingBox, GeoTransform, PixelWindow, RasterError, RasterResult};

/// Resolve the pixel window of a `width` x `height` raster covered by `bbox`.
///
/// Corners are mapped to fractional pixels, the window spans
/// `floor(min)..ceil(max)` on each axis and is clamped to the raster.
/// Anything that leaves no pixel is [`RasterError::OutOfExtent`].
pub fn resolve(bbox: &BoundingBox, geotransform: &GeoTransform, width: usize, height: usize) -> RasterResult<PixelWindow> {
    let mut min_px = f64::INFINITY;
    let mut min_py = f64::INFINITY;
    let mut max_px = f64::NEG_INFINITY;
    let mut max_py = f64::NEG_INFINITY;

    for (x, y) in bbox.corners() {
        let (px, py) = geotransform.geo_to_pixel(x, y);
        if !px.is_finite() || !py.is_finite() {
            return Err(RasterError::out_of_extent(format!(
                "bbox {:?} has no pixel position under {:?}",
                bbox.to_array(),
                geotransform.to_coefficients()
            )));
        }
        min_px = min_px.min(px);
        min_py = min_py.min(py);
        max_px = max_px.max(px);
        max_py = max_py.max(py);
    }

    let (x_off, x_end) = clamp_axis(min_px, max_px, width);
    let (y_off, y_end) = clamp_axis(min_py, max_py, height);

    if x_end <= x_off || y_end <= y_off {
        return Err(RasterError::out_of_extent(format!(
            "bbox {:?} resolves to an empty window on a {}x{} raster",
            bbox.to_array(),
            width,
            height
        )));
    }

    Ok(PixelWindow::new(
        x_off as usize,
        y_off as usize,
        (x_end - x_off) as usize,
        (y_end - y_off) as usize,
    ))
}

/// `floor(min)..ceil(max)` clamped to `0..size`.
fn clamp_axis(min: f64, max: f64, size: usize) -> (i64, i64) {
    let size = size as i64;
    let start = (min.floor() as i64).clamp(0, size);
    let end = (max.ceil() as i64).clamp(0, size);
    (start, end)
}

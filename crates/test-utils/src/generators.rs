//! Synthetic raster band generators.
//!
//! All generators return row-major `Vec<f64>` bands with predictable values
//! so tests can check exactly which source pixel ended up where.

/// Creates a band whose value encodes its position: `col * 1000 + row`.
///
/// # Example
///
/// ```
/// use test_utils::create_index_band;
///
/// let band = create_index_band(10, 5);
/// assert_eq!(band.len(), 50);
/// assert_eq!(band[1], 1000.0);  // col=1, row=0
/// assert_eq!(band[10], 1.0);    // col=0, row=1
/// ```
pub fn create_index_band(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f64);
        }
    }
    data
}

/// Creates a byte-valued band spanning exactly 0..=255.
///
/// The first sample is 0 and the last is 255 (for rasters with at least two
/// pixels), so a full scan reports the value range `[0, 255]`.
pub fn create_byte_ramp(width: usize, height: usize) -> Vec<f64> {
    let n = width * height;
    let last = n.saturating_sub(1).max(1) as f64;
    (0..n).map(|i| (i as f64 / last * 255.0).round()).collect()
}

/// Creates a band shaped like elevation in meters (0 to ~4000).
pub fn create_elevation_band(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt().max(1.0);
    for row in 0..height {
        for col in 0..width {
            let dx = col as f64 - cx;
            let dy = row as f64 - cy;
            // peak in the middle, sea level at the corners
            let dist = (dx * dx + dy * dy).sqrt();
            data.push((1.0 - dist / max_dist) * 4000.0);
        }
    }
    data
}

/// Creates a band filled with one value.
pub fn create_constant_band(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// Replaces every `every`-th sample of `band` with NaN.
pub fn with_nans(mut band: Vec<f64>, every: usize) -> Vec<f64> {
    if every == 0 {
        return band;
    }
    for value in band.iter_mut().step_by(every) {
        *value = f64::NAN;
    }
    band
}

/// Creates three byte bands (R = column ramp, G = row ramp, B = 128).
pub fn create_rgb_bands(width: usize, height: usize) -> Vec<Vec<f64>> {
    let mut r = Vec::with_capacity(width * height);
    let mut g = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            r.push((col * 255 / width.max(1)) as f64);
            g.push((row * 255 / height.max(1)) as f64);
        }
    }
    vec![r, g, create_constant_band(width, height, 128.0)]
}

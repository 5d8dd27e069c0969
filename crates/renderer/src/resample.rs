//! Nearest-neighbour resampling of sample grids.

/// Resample a row-major grid to `dst_width` x `dst_height` by nearest neighbour.
///
/// Destination pixel `(x, y)` takes source pixel
/// `(floor(x * src_w / dst_w), floor(y * src_h / dst_h))`, computed in integer
/// arithmetic and clamped to the last row/column. Equal sizes return the
/// input unchanged.
///
/// # Arguments
/// - `samples`: Source samples, `src_width * src_height` values
/// - `src_width`, `src_height`: Source size
/// - `dst_width`, `dst_height`: Destination size
pub fn resample_nearest(
    samples: &[f64],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<f64> {
    if src_width == dst_width && src_height == dst_height {
        return samples.to_vec();
    }
    if src_width == 0 || src_height == 0 || dst_width == 0 || dst_height == 0 {
        return Vec::new();
    }

    let src_cols: Vec<usize> = (0..dst_width)
        .map(|x| (x * src_width / dst_width).min(src_width - 1))
        .collect();

    let mut output = Vec::with_capacity(dst_width * dst_height);
    for y in 0..dst_height {
        let src_y = (y * src_height / dst_height).min(src_height - 1);
        let row = &samples[src_y * src_width..(src_y + 1) * src_width];
        output.extend(src_cols.iter().map(|&x| row[x]));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_size_is_identity() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(resample_nearest(&data, 2, 2, 2, 2), data);
    }

    #[test]
    fn test_upsample_doubles_pixels() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        let out = resample_nearest(&data, 2, 2, 4, 4);
        assert_eq!(
            out,
            vec![
                1.0, 1.0, 2.0, 2.0, //
                1.0, 1.0, 2.0, 2.0, //
                3.0, 3.0, 4.0, 4.0, //
                3.0, 3.0, 4.0, 4.0,
            ]
        );
    }

    #[test]
    fn test_downsample_takes_floor() {
        let data: Vec<f64> = (0..16).map(|v| v as f64).collect();
        assert_eq!(resample_nearest(&data, 4, 4, 2, 2), vec![0.0, 2.0, 8.0, 10.0]);
    }

    #[test]
    fn test_non_integer_ratio() {
        let data = vec![0.0, 1.0, 2.0];
        // x * 3 / 2: 0, 1
        assert_eq!(resample_nearest(&data, 3, 1, 2, 1), vec![0.0, 1.0]);
        // x * 3 / 5: 0, 0, 1, 1, 2
        assert_eq!(resample_nearest(&data, 3, 1, 5, 1), vec![0.0, 0.0, 1.0, 1.0, 2.0]);
    }
}

//! Sample value ranges.

use serde::{Deserialize, Serialize};

/// Minimum and maximum sample value of a band.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// The range of an 8-bit band.
    pub const BYTE: ValueRange = ValueRange { min: 0.0, max: 255.0 };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Scan samples for their range, skipping NaN.
    ///
    /// Returns `None` when there is no non-NaN sample.
    pub fn scan(samples: &[f64]) -> Option<Self> {
        samples
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc: Option<ValueRange>, v| {
                Some(match acc {
                    None => ValueRange::new(v, v),
                    Some(r) => ValueRange::new(r.min.min(v), r.max.max(v)),
                })
            })
    }

    /// Whether this is exactly `[0, 255]`.
    pub fn is_byte(&self) -> bool {
        *self == Self::BYTE
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_skips_nan() {
        let r = ValueRange::scan(&[f64::NAN, 3.0, -2.0, f64::NAN, 7.5]).unwrap();
        assert_eq!(r, ValueRange::new(-2.0, 7.5));
        assert_eq!(r.span(), 9.5);
    }

    #[test]
    fn test_scan_empty_or_all_nan() {
        assert_eq!(ValueRange::scan(&[]), None);
        assert_eq!(ValueRange::scan(&[f64::NAN]), None);
    }

    #[test]
    fn test_is_byte() {
        assert!(ValueRange::new(0.0, 255.0).is_byte());
        assert!(!ValueRange::new(0.0, 254.0).is_byte());
    }
}

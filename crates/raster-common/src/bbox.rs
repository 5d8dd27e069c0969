//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::error::RasterError;

/// A geographic or projected bounding box.
///
/// For geographic CRS (EPSG:4326), coordinates are in degrees.
/// For projected CRS (EPSG:3857, etc.), coordinates are in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build from `[min_x, min_y, max_x, max_y]`, rejecting inverted or non-finite boxes.
    pub fn from_array(bbox: [f64; 4]) -> Result<Self, RasterError> {
        let b = Self::new(bbox[0], bbox[1], bbox[2], bbox[3]);
        if !b.is_valid() {
            return Err(RasterError::InvalidBbox(format!("{:?}", bbox)));
        }
        Ok(b)
    }

    /// Parse a "minx,miny,maxx,maxy" string.
    pub fn parse(s: &str) -> Result<Self, RasterError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(RasterError::InvalidBbox(format!(
                "{}. Expected 'minx,miny,maxx,maxy'",
                s
            )));
        }

        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| RasterError::InvalidBbox(format!("invalid number: {}", part)))?;
        }
        Self::from_array(values)
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    /// Finite coordinates with min strictly below max on both axes.
    pub fn is_valid(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
            && self.min_x < self.max_x
            && self.min_y < self.max_y
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Corner points, clockwise from the upper left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_x, self.max_y),
            (self.max_x, self.max_y),
            (self.max_x, self.min_y),
            (self.min_x, self.min_y),
        ]
    }

    /// Smallest box containing all points.
    pub fn from_points(points: &[(f64, f64)]) -> Option<Self> {
        let mut iter = points.iter().filter(|(x, y)| x.is_finite() && y.is_finite());
        let &(x0, y0) = iter.next()?;
        let mut b = Self::new(x0, y0, x0, y0);
        for &(x, y) in iter {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    /// Check if this bbox intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox() {
        let bbox = BoundingBox::parse("-125.0,24.0,-66.0,50.0").unwrap();
        assert_eq!(bbox.min_x, -125.0);
        assert_eq!(bbox.min_y, 24.0);
        assert_eq!(bbox.max_x, -66.0);
        assert_eq!(bbox.max_y, 50.0);
    }

    #[test]
    fn test_parse_rejects_inverted_bbox() {
        assert!(BoundingBox::parse("10,0,0,10").is_err());
        assert!(BoundingBox::parse("0,0,10").is_err());
        assert!(BoundingBox::parse("a,0,1,1").is_err());
    }

    #[test]
    fn test_intersects_is_strict() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let c = BoundingBox::new(20.0, 20.0, 30.0, 30.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        // touching edges do not overlap
        assert!(!a.intersects(&BoundingBox::new(10.0, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn test_from_points_skips_non_finite() {
        let b = BoundingBox::from_points(&[(1.0, 2.0), (f64::NAN, 0.0), (-3.0, 5.0)]).unwrap();
        assert_eq!(b, BoundingBox::new(-3.0, 2.0, 1.0, 5.0));
        assert!(BoundingBox::from_points(&[]).is_none());
    }
}

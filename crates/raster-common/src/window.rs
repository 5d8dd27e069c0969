//! Rectangular regions in raster pixel space.

use serde::{Deserialize, Serialize};

/// A pixel window: offset plus size, in raster pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelWindow {
    pub x_offset: usize,
    pub y_offset: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelWindow {
    pub fn new(x_offset: usize, y_offset: usize, width: usize, height: usize) -> Self {
        Self {
            x_offset,
            y_offset,
            width,
            height,
        }
    }

    /// The window covering a whole raster.
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the window lies inside a `width` x `height` raster.
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        self.x_offset + self.width <= width && self.y_offset + self.height <= height
    }
}

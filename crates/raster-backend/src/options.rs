//! Option types for backend warp and translate calls.

use raster_common::{BoundingBox, CrsCode};
use serde::{Deserialize, Serialize};

/// Where a derived dataset is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Memory,
}

/// Sampling method used when warping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resampling {
    #[default]
    Nearest,
    Bilinear,
}

impl Resampling {
    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "nearest" | "near" => Some(Self::Nearest),
            "bilinear" => Some(Self::Bilinear),
            _ => None,
        }
    }
}

/// Parameters for a warp (reproject and/or resize) call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WarpOptions {
    /// Output size in pixels; derived from the source resolution when `None`.
    pub target_size: Option<(usize, usize)>,
    /// Output extent; the source bounds when `None`.
    pub extent: Option<BoundingBox>,
    /// CRS the `extent` is expressed in; the target CRS when `None`.
    pub extent_crs: Option<CrsCode>,
    /// Overrides the source dataset's own CRS.
    pub source_crs: Option<CrsCode>,
    /// Output CRS; the source CRS when `None`.
    pub target_crs: Option<CrsCode>,
    pub resampling: Resampling,
    pub output_format: OutputFormat,
}

impl WarpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_size(mut self, width: usize, height: usize) -> Self {
        self.target_size = Some((width, height));
        self
    }

    pub fn with_extent(mut self, extent: BoundingBox, crs: CrsCode) -> Self {
        self.extent = Some(extent);
        self.extent_crs = Some(crs);
        self
    }

    pub fn with_source_crs(mut self, crs: CrsCode) -> Self {
        self.source_crs = Some(crs);
        self
    }

    pub fn with_target_crs(mut self, crs: CrsCode) -> Self {
        self.target_crs = Some(crs);
        self
    }

    pub fn with_resampling(mut self, resampling: Resampling) -> Self {
        self.resampling = resampling;
        self
    }
}

/// Parameters for a translate (format copy) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TranslateOptions {
    pub output_format: OutputFormat,
}

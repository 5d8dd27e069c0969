//! Configuration for the dataset registry.

use raster_backend::Resampling;
use raster_common::{CrsCode, RasterError, RasterResult};
use serde::{Deserialize, Serialize};

/// How a source is turned into a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStrategy {
    /// Warp the whole view to the output size, then read it.
    #[default]
    Warp,
    /// Read only the pixel window under the view extent, then resample.
    Windowed,
}

impl RenderStrategy {
    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "warp" | "warp_then_read" => Some(Self::Warp),
            "windowed" | "windowed_read" | "window" => Some(Self::Windowed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warp => "warp",
            Self::Windowed => "windowed",
        }
    }
}

impl std::fmt::Display for RenderStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the dataset registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Strategy used by `RasterSource::render`.
    pub render_strategy: RenderStrategy,

    /// Sampling used by warps.
    pub resampling: Resampling,

    /// CRS that zoom bounding boxes are expressed in.
    pub zoom_extent_crs: String,

    /// Largest accepted output width or height.
    pub max_render_size: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            render_strategy: RenderStrategy::Warp,
            resampling: Resampling::Nearest,
            zoom_extent_crs: "EPSG:3857".to_string(),
            max_render_size: 8192,
        }
    }
}

impl RegistryConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RASTER_RENDER_STRATEGY") {
            if let Some(strategy) = RenderStrategy::parse(&val) {
                config.render_strategy = strategy;
            }
        }

        if let Ok(val) = std::env::var("RASTER_RESAMPLING") {
            if let Some(resampling) = Resampling::parse(&val) {
                config.resampling = resampling;
            }
        }

        if let Ok(val) = std::env::var("RASTER_ZOOM_EXTENT_CRS") {
            config.zoom_extent_crs = val;
        }

        if let Ok(val) = std::env::var("RASTER_MAX_RENDER_SIZE") {
            if let Ok(size) = val.parse() {
                config.max_render_size = size;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_render_size == 0 {
            return Err("max_render_size must be > 0".to_string());
        }

        if let Err(e) = CrsCode::parse(&self.zoom_extent_crs) {
            return Err(format!("zoom_extent_crs: {}", e));
        }

        Ok(())
    }

    /// The parsed zoom extent CRS.
    pub fn extent_crs(&self) -> RasterResult<CrsCode> {
        CrsCode::parse(&self.zoom_extent_crs).map_err(|e| RasterError::Config(e.to_string()))
    }
}

//! Error types for raster loading and rendering.

use std::fmt;
use thiserror::Error;

/// Result type alias using RasterError.
pub type RasterResult<T> = Result<T, RasterError>;

/// Backend capability that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    Open,
    Warp,
    Translate,
    Read,
    Geotransform,
    Close,
}

impl fmt::Display for BackendOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendOp::Open => "open",
            BackendOp::Warp => "warp",
            BackendOp::Translate => "translate",
            BackendOp::Read => "read",
            BackendOp::Geotransform => "geotransform",
            BackendOp::Close => "close",
        };
        f.write_str(name)
    }
}

/// Primary error type for raster operations.
#[derive(Debug, Error)]
pub enum RasterError {
    // === Registry Errors ===
    #[error("no such dataset exists: {0}. consider loading it first")]
    NotLoaded(String),

    // === Backend Errors ===
    /// Propagated verbatim from the backend, tagged with the failing capability.
    #[error("backend {op} failed: {message}")]
    Backend { op: BackendOp, message: String },

    // === Rendering Errors ===
    #[error("cannot render raster {path} with {bands} bands")]
    UnsupportedBandCount { path: String, bands: usize },

    #[error("cannot render raster {path} without a style: value range [{min}, {max}] is not [0, 255]")]
    UnsupportedValueRange { path: String, min: f64, max: f64 },

    #[error("requested extent does not overlap the raster: {0}")]
    OutOfExtent(String),

    #[error("invalid output size {width}x{height}: {reason}")]
    InvalidSize {
        width: u32,
        height: u32,
        reason: String,
    },

    // === Input Errors ===
    #[error("style parse error: {0}")]
    StyleParse(String),

    #[error("Invalid CRS: {0}")]
    InvalidCrs(String),

    #[error("Invalid BBOX: {0}")]
    InvalidBbox(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RasterError {
    /// Create a backend failure for the given capability.
    pub fn backend(op: BackendOp, message: impl Into<String>) -> Self {
        Self::Backend {
            op,
            message: message.into(),
        }
    }

    /// Create an OutOfExtent error.
    pub fn out_of_extent(msg: impl Into<String>) -> Self {
        Self::OutOfExtent(msg.into())
    }

    /// The backend capability that failed, if this is a backend error.
    pub fn backend_op(&self) -> Option<BackendOp> {
        match self {
            RasterError::Backend { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// Short machine-readable kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            RasterError::NotLoaded(_) => "not_loaded",
            RasterError::Backend { .. } => "backend",
            RasterError::UnsupportedBandCount { .. } => "unsupported_band_count",
            RasterError::UnsupportedValueRange { .. } => "unsupported_value_range",
            RasterError::OutOfExtent(_) => "out_of_extent",
            RasterError::InvalidSize { .. } => "invalid_size",
            RasterError::StyleParse(_) => "style_parse",
            RasterError::InvalidCrs(_) => "invalid_crs",
            RasterError::InvalidBbox(_) => "invalid_bbox",
            RasterError::Config(_) => "config",
            RasterError::Encode(_) => "encode",
            RasterError::Io(_) => "io",
        }
    }
}

impl From<serde_json::Error> for RasterError {
    fn from(err: serde_json::Error) -> Self {
        RasterError::StyleParse(format!("JSON error: {}", err))
    }
}

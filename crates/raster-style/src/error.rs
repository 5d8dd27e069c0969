//! Style parsing errors.

use raster_common::RasterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StyleError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("invalid JSON style: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported style format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to read style file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StyleError {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

impl From<StyleError> for RasterError {
    fn from(err: StyleError) -> Self {
        RasterError::StyleParse(err.to_string())
    }
}

//! Options accepted by [`crate::DatasetRegistry::load`].

use std::path::Path;

use raster_common::{CrsCode, RasterResult};
use raster_style::{load_style_file, StyleDefinition};

/// Per-load settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOptions {
    /// Style attached to the loaded source. Unstyled sources render as grayscale.
    pub style: Option<StyleDefinition>,
    /// CRS to assume for the dataset instead of the one it declares.
    pub source_crs: Option<CrsCode>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: StyleDefinition) -> Self {
        self.style = Some(style);
        self
    }

    /// Treat the dataset as being in `crs`, for files with missing or wrong GeoKeys.
    pub fn with_source_crs(mut self, crs: CrsCode) -> Self {
        self.source_crs = Some(crs);
        self
    }

    /// Attach the style stored in `path` (`.css` or `.json`).
    ///
    /// Unreadable or malformed files are reported here rather than at load time.
    pub fn with_style_file(self, path: impl AsRef<Path>) -> RasterResult<Self> {
        let style = load_style_file(path)?;
        Ok(self.with_style(style))
    }
}

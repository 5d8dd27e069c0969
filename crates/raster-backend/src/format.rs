//! Raster file formats the backend can open.

use std::fmt;
use std::path::Path;

/// Supported raster formats.
///
/// Each variant corresponds to one driver that must be registered before
/// files of that format can be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterFormat {
    GeoTiff,
}

impl RasterFormat {
    pub const ALL: &'static [RasterFormat] = &[RasterFormat::GeoTiff];

    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "tif" | "tiff" => Some(RasterFormat::GeoTiff),
            _ => None,
        }
    }

    /// Short driver name.
    pub fn driver_name(&self) -> &'static str {
        match self {
            RasterFormat::GeoTiff => "GTiff",
        }
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.driver_name())
    }
}

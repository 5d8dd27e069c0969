//! Geospatial backend abstraction.
//!
//! The registry never touches raster files directly. Everything that opens,
//! reprojects, copies or reads a dataset goes through a [`RasterBackend`],
//! and every open dataset is represented by an owned [`DatasetHandle`] that
//! closes itself when dropped.
//!
//! # Architecture
//!
//! ```text
//! DatasetRegistry / RasterSource
//!      │
//!      ▼
//! DatasetHandle (owned, closes on drop)
//!      │
//!      ▼
//! RasterBackend trait ──► MemoryBackend (GeoTIFF decode, pure-Rust warp)
//! ```

pub mod format;
pub mod handle;
pub mod memory;
pub mod options;

pub use format::RasterFormat;
pub use handle::{DatasetHandle, HandleId};
pub use memory::{MemDataset, MemoryBackend};
pub use options::{OutputFormat, Resampling, TranslateOptions, WarpOptions};

use raster_common::{CrsCode, GeoTransform, PixelWindow, RasterResult};

/// Trait for the library that actually opens and transforms raster datasets.
///
/// Datasets are addressed by [`HandleId`]; callers normally use the safe
/// [`DatasetHandle`] wrapper instead of these methods. All failures are
/// reported as [`raster_common::RasterError::Backend`] tagged with the
/// failing capability.
pub trait RasterBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Make every supported [`RasterFormat`] driver available. Idempotent.
    fn register_drivers(&self);

    /// Open a dataset read-only.
    fn open(&self, path: &str) -> RasterResult<HandleId>;

    /// Reproject and/or resample into a new in-memory dataset.
    fn warp(&self, source: HandleId, options: &WarpOptions) -> RasterResult<HandleId>;

    /// Copy a dataset into a new in-memory dataset.
    fn translate(&self, source: HandleId, options: &TranslateOptions) -> RasterResult<HandleId>;

    /// Read one band (1-based) over a pixel window, row-major.
    fn read_window(&self, handle: HandleId, band: usize, window: PixelWindow) -> RasterResult<Vec<f64>>;

    fn geotransform(&self, handle: HandleId) -> RasterResult<GeoTransform>;

    /// Raster size as `(width, height)`.
    fn raster_size(&self, handle: HandleId) -> RasterResult<(usize, usize)>;

    fn band_count(&self, handle: HandleId) -> RasterResult<usize>;

    fn crs(&self, handle: HandleId) -> RasterResult<CrsCode>;

    /// Release a dataset. Closing an unknown or already closed handle is an error.
    fn close(&self, handle: HandleId) -> RasterResult<()>;
}

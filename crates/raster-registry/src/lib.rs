//! Dataset registry and tile rendering.
//!
//! [`DatasetRegistry`] opens rasters through a [`raster_backend::RasterBackend`]
//! and caches them by file name. Each cached [`RasterSource`] can be zoomed
//! into a new source for a bounding box and rendered to an image:
//!
//! ```text
//! load(path) ──► RasterSource ──zoom(bbox, crs)──► RasterSource ──render(w, h)──► RenderedImage ──► PNG
//! ```
//!
//! Sources are immutable once built. Zoom, clip and copy return new sources
//! that own their own dataset handle, so the cached source can be shared
//! freely between threads.

pub mod config;
pub mod geometry;
pub mod metrics;
pub mod options;
pub mod registry;
pub mod render;
pub mod source;

pub use config::{RegistryConfig, RenderStrategy};
pub use geometry::resolve;
pub use options::LoadOptions;
pub use registry::DatasetRegistry;
pub use source::RasterSource;

pub use renderer::RenderedImage;

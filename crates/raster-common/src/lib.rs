//! Common types and utilities shared across the raster-tiles crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod geotransform;
pub mod range;
pub mod window;

pub use bbox::BoundingBox;
pub use crs::CrsCode;
pub use error::{BackendOp, RasterError, RasterResult};
pub use geotransform::GeoTransform;
pub use range::ValueRange;
pub use window::PixelWindow;

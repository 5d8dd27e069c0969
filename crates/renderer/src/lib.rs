//! Image rendering for raster tiles.
//!
//! Implements the drawing half of the render pipeline:
//! - Grayscale normalization of byte-ranged bands
//! - Color-map styling of single bands
//! - RGB passthrough of three-band rasters
//! - Nearest-neighbour resampling of sample windows
//! - PNG encoding (gray, RGB, indexed, RGBA)

pub mod draw;
pub mod output;
pub mod png;
pub mod resample;

pub use draw::{draw_color_map, draw_grayscale, draw_rgb, normalize_byte};
pub use output::RenderedImage;
pub use png::{ColorType, PngError};
pub use resample::resample_nearest;

//! Style engine for raster rendering.
//!
//! A style is an ordered color-map: each entry owns the half-open value
//! interval ending at its quantity, and the last entry also catches every
//! value above it. Styles are read from a small CSS-like text format or
//! from JSON.

pub mod color;
pub mod colormap;
pub mod error;
pub mod model;
pub mod parser;

pub use color::{parse_hex_color, Rgba};
pub use colormap::ColorMap;
pub use error::StyleError;
pub use model::{ColorMapEntry, StyleDefinition};
pub use parser::{load_style_file, parse_css_style, parse_json_style, StyleFormat};

//! Style file parsers.
//!
//! The text format is line oriented:
//!
//! ```text
//! raster {
//!     raster-channels: auto;
//!     color-map-entry(#000000, 0, 1.0, "no data");
//!     color-map-entry(#ff0000, 100, 1.0, "high, very");
//! }
//! ```
//!
//! Lines that are neither a channel declaration nor a color-map entry are skipped.

use std::path::Path;

use tracing::debug;

use crate::error::StyleError;
use crate::model::{ColorMapEntry, StyleDefinition};

const CHANNELS_KEY: &str = "raster-channels";
const ENTRY_PREFIX: &str = "color-map-entry(";

/// Supported style file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleFormat {
    Css,
    Json,
}

impl StyleFormat {
    /// Pick the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "css" => Some(StyleFormat::Css),
            "json" => Some(StyleFormat::Json),
            _ => None,
        }
    }
}

/// Read a style file, choosing the parser from its extension.
pub fn load_style_file(path: impl AsRef<Path>) -> Result<StyleDefinition, StyleError> {
    let path = path.as_ref();
    let format = StyleFormat::from_path(path)
        .ok_or_else(|| StyleError::UnsupportedFormat(path.display().to_string()))?;

    let text = std::fs::read_to_string(path).map_err(|source| StyleError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let style = match format {
        StyleFormat::Css => parse_css_style(&text)?,
        StyleFormat::Json => parse_json_style(&text)?,
    };

    debug!(
        path = %path.display(),
        entries = style.color_map.len(),
        channels = %style.raster_channels,
        "Loaded style file"
    );

    Ok(style)
}

/// Parse a JSON-encoded [`StyleDefinition`].
pub fn parse_json_style(text: &str) -> Result<StyleDefinition, StyleError> {
    Ok(serde_json::from_str(text)?)
}

/// Parse the CSS-like style text format.
pub fn parse_css_style(text: &str) -> Result<StyleDefinition, StyleError> {
    let mut style = StyleDefinition::default();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        let line_no = index + 1;

        if line.is_empty() || line.starts_with("//") || line.starts_with("/*") || line.starts_with('*') {
            continue;
        }

        if let Some(rest) = line.strip_prefix(CHANNELS_KEY) {
            if let Some((_, value)) = rest.split_once(':') {
                style.raster_channels = value.trim().trim_end_matches(';').trim().to_string();
            }
            continue;
        }

        if let Some(body) = line.strip_prefix(ENTRY_PREFIX) {
            style.color_map.push(parse_entry(body, line_no)?);
        }
    }

    Ok(style)
}

fn parse_entry(body: &str, line: usize) -> Result<ColorMapEntry, StyleError> {
    let body = body.trim_end().trim_end_matches(';').trim_end();
    let body = body
        .strip_suffix(')')
        .ok_or_else(|| StyleError::syntax(line, "color-map-entry is missing its closing parenthesis"))?;

    // the label is last and may itself contain commas
    let mut fields = body.splitn(4, ',');
    let (color, quantity, opacity, label) = match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(c), Some(q), Some(o), Some(l)) => (c.trim(), q.trim(), o.trim(), l.trim()),
        _ => {
            return Err(StyleError::syntax(
                line,
                "color-map-entry needs 4 fields: color, quantity, opacity, label",
            ))
        }
    };

    let quantity: f64 = quantity
        .parse()
        .map_err(|_| StyleError::syntax(line, format!("invalid quantity '{}'", quantity)))?;
    let opacity: f64 = opacity
        .parse()
        .map_err(|_| StyleError::syntax(line, format!("invalid opacity '{}'", opacity)))?;

    Ok(ColorMapEntry::new(color, quantity, opacity, label.trim_matches('"')))
}

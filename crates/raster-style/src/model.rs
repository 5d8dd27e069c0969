//! Style data model.

use serde::{Deserialize, Serialize};

use crate::colormap::ColorMap;

/// One color-map entry.
///
/// `quantity` is the upper bound of the interval this entry owns.
/// `opacity` is parsed and kept but not composited into the output alpha.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorMapEntry {
    /// Hex color code
    pub color: String,
    pub quantity: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Description label (diagnostic only)
    #[serde(default)]
    pub label: String,
}

fn default_opacity() -> f64 {
    1.0
}

impl ColorMapEntry {
    pub fn new(color: impl Into<String>, quantity: f64, opacity: f64, label: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            quantity,
            opacity,
            label: label.into(),
        }
    }
}

/// A raster style: channel mode plus an ordered color-map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleDefinition {
    #[serde(default)]
    pub raster_channels: String,
    /// Entries in ascending `quantity` order. Never re-sorted.
    #[serde(default)]
    pub color_map: Vec<ColorMapEntry>,
}

impl StyleDefinition {
    pub fn new(raster_channels: impl Into<String>, color_map: Vec<ColorMapEntry>) -> Self {
        Self {
            raster_channels: raster_channels.into(),
            color_map,
        }
    }

    /// Compile the entries into a lookup table.
    pub fn color_map(&self) -> ColorMap {
        ColorMap::from_style(self)
    }

    /// Report problems that make evaluation produce surprising colors.
    ///
    /// Returns human-readable warnings; an empty list means the style is well formed.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.color_map.is_empty() {
            warnings.push("color map has no entries; every sample renders transparent".to_string());
        }

        for (i, pair) in self.color_map.windows(2).enumerate() {
            if pair[1].quantity < pair[0].quantity {
                warnings.push(format!(
                    "entry {} quantity {} is below entry {} quantity {}; entries are not re-sorted",
                    i + 1,
                    pair[1].quantity,
                    i,
                    pair[0].quantity
                ));
            }
        }

        for (i, entry) in self.color_map.iter().enumerate() {
            if !entry.quantity.is_finite() {
                warnings.push(format!("entry {} has non-finite quantity", i));
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_reports_descending_quantities() {
        let style = StyleDefinition::new(
            "auto",
            vec![
                ColorMapEntry::new("#000000", 10.0, 1.0, "a"),
                ColorMapEntry::new("#ffffff", 5.0, 1.0, "b"),
            ],
        );
        let warnings = style.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("not re-sorted"));
    }

    #[test]
    fn test_validate_ok() {
        let style = StyleDefinition::new(
            "auto",
            vec![
                ColorMapEntry::new("#000000", 0.0, 1.0, "low"),
                ColorMapEntry::new("#ffffff", 5.0, 1.0, "high"),
            ],
        );
        assert!(style.validate().is_empty());
    }

    #[test]
    fn test_json_defaults() {
        let style: StyleDefinition =
            serde_json::from_str(r##"{"color_map": [{"color": "#fff", "quantity": 3}]}"##).unwrap();
        assert_eq!(style.raster_channels, "");
        assert_eq!(style.color_map[0].opacity, 1.0);
        assert_eq!(style.color_map[0].label, "");
    }
}

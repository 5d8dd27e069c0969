//! Color-map evaluation.

use crate::color::{parse_hex_color, Rgba};
use crate::model::StyleDefinition;

/// Compiled color-map: quantities with their pre-parsed colors, in style order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorMap {
    stops: Vec<(f64, Rgba)>,
}

impl ColorMap {
    pub fn from_style(style: &StyleDefinition) -> Self {
        Self {
            stops: style
                .color_map
                .iter()
                .map(|entry| (entry.quantity, parse_hex_color(&entry.color)))
                .collect(),
        }
    }

    pub fn from_stops(stops: Vec<(f64, Rgba)>) -> Self {
        Self { stops }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Map a raw sample to a color.
    ///
    /// Entry 0 owns `(-inf, q0]`, entry `i` owns `(q[i-1], q[i]]` and the last
    /// entry additionally owns everything above its own quantity. The first
    /// interval containing the value wins. NaN and empty maps give
    /// [`Rgba::TRANSPARENT`].
    pub fn evaluate(&self, value: f64) -> Rgba {
        if value.is_nan() {
            return Rgba::TRANSPARENT;
        }

        let last = match self.stops.len() {
            0 => return Rgba::TRANSPARENT,
            n => n - 1,
        };

        let mut previous = f64::NEG_INFINITY;
        for (i, &(quantity, color)) in self.stops.iter().enumerate() {
            let above_previous = i == 0 || value > previous;
            if above_previous && (value <= quantity || i == last) {
                return color;
            }
            previous = quantity;
        }

        Rgba::TRANSPARENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColorMapEntry;

    const RED: Rgba = Rgba::opaque(255, 0, 0);
    const GREEN: Rgba = Rgba::opaque(0, 255, 0);
    const BLUE: Rgba = Rgba::opaque(0, 0, 255);

    fn three_stop_map() -> ColorMap {
        ColorMap::from_stops(vec![(0.0, RED), (10.0, GREEN), (20.0, BLUE)])
    }

    #[test]
    fn test_exact_quantity_belongs_to_entry() {
        let map = three_stop_map();
        assert_eq!(map.evaluate(0.0), RED);
        assert_eq!(map.evaluate(10.0), GREEN);
        assert_eq!(map.evaluate(20.0), BLUE);
    }

    #[test]
    fn test_between_quantities_belongs_to_next_entry() {
        let map = three_stop_map();
        assert_eq!(map.evaluate(0.5), GREEN);
        assert_eq!(map.evaluate(9.999), GREEN);
        assert_eq!(map.evaluate(10.0001), BLUE);
    }

    #[test]
    fn test_below_first_and_above_last() {
        let map = three_stop_map();
        assert_eq!(map.evaluate(-1e9), RED);
        assert_eq!(map.evaluate(1e9), BLUE);
        assert_eq!(map.evaluate(f64::INFINITY), BLUE);
        assert_eq!(map.evaluate(f64::NEG_INFINITY), RED);
    }

    #[test]
    fn test_nan_and_empty_are_transparent() {
        assert_eq!(three_stop_map().evaluate(f64::NAN), Rgba::TRANSPARENT);
        assert_eq!(ColorMap::default().evaluate(1.0), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_single_entry_catches_everything() {
        let map = ColorMap::from_stops(vec![(5.0, GREEN)]);
        assert_eq!(map.evaluate(-100.0), GREEN);
        assert_eq!(map.evaluate(100.0), GREEN);
    }

    #[test]
    fn test_unsorted_entries_are_not_resorted() {
        // middle entry is unreachable: everything up to 10 is already claimed
        let map = ColorMap::from_stops(vec![(10.0, RED), (5.0, GREEN), (20.0, BLUE)]);
        assert_eq!(map.evaluate(3.0), RED);
        assert_eq!(map.evaluate(5.0), RED);
        assert_eq!(map.evaluate(7.0), RED);
        assert_eq!(map.evaluate(15.0), BLUE);
    }

    #[test]
    fn test_hex_survives_single_entry_map() {
        for r in (0..=255u8).step_by(17) {
            for g in (0..=255u8).step_by(15) {
                for b in (0..=255u8).step_by(51) {
                    let expected = Rgba::opaque(r, g, b);
                    for hex in [format!("#{:02x}{:02x}{:02x}", r, g, b), format!("{:02X}{:02X}{:02X}", r, g, b)] {
                        let style = StyleDefinition::new("auto", vec![ColorMapEntry::new(hex.clone(), 100.0, 1.0, "")]);
                        let map = style.color_map();
                        for value in [-1e9, 0.0, 100.0, 1e9] {
                            assert_eq!(map.evaluate(value), expected, "{} at {}", hex, value);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_from_style_parses_colors() {
        let style = StyleDefinition::new(
            "auto",
            vec![
                ColorMapEntry::new("#f00", 1.0, 1.0, "one"),
                ColorMapEntry::new("not-a-color", 2.0, 1.0, "two"),
            ],
        );
        let map = style.color_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map.evaluate(1.0), RED);
        assert_eq!(map.evaluate(2.0), Rgba::TRANSPARENT);
    }
}

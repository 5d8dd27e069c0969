//! RGBA colors and hex color parsing.

use serde::{Deserialize, Serialize};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black, returned for anything that cannot be colored.
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Parse a hex color string to RGBA.
///
/// Accepts an optional leading `#` followed by 3 (`RGB`, each digit doubled),
/// 6 (`RRGGBB`) or 8 (`RRGGBBAA`) hex digits. Alpha is 255 unless given.
/// Anything else degrades to [`Rgba::TRANSPARENT`] instead of failing.
pub fn parse_hex_color(hex: &str) -> Rgba {
    let hex = hex.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);

    // from_str_radix accepts a leading '+', so check the digits up front
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Rgba::TRANSPARENT;
    }

    match hex.len() {
        3 => {
            let r = parse_byte(&hex[0..1].repeat(2));
            let g = parse_byte(&hex[1..2].repeat(2));
            let b = parse_byte(&hex[2..3].repeat(2));
            Rgba::opaque(r, g, b)
        }
        6 => Rgba::opaque(
            parse_byte(&hex[0..2]),
            parse_byte(&hex[2..4]),
            parse_byte(&hex[4..6]),
        ),
        8 => Rgba::new(
            parse_byte(&hex[0..2]),
            parse_byte(&hex[2..4]),
            parse_byte(&hex[4..6]),
            parse_byte(&hex[6..8]),
        ),
        _ => Rgba::TRANSPARENT,
    }
}

fn parse_byte(pair: &str) -> u8 {
    u8::from_str_radix(pair, 16).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_digit_hex() {
        assert_eq!(parse_hex_color("#FF0000"), Rgba::opaque(255, 0, 0));
        assert_eq!(parse_hex_color("00FF00"), Rgba::opaque(0, 255, 0));
        assert_eq!(parse_hex_color("#0000ff"), Rgba::opaque(0, 0, 255));
    }

    #[test]
    fn test_shorthand_matches_long_form() {
        assert_eq!(parse_hex_color("abc"), parse_hex_color("aabbcc"));
        assert_eq!(parse_hex_color("#fff"), Rgba::opaque(255, 255, 255));
    }

    #[test]
    fn test_eight_digit_alpha() {
        assert_eq!(parse_hex_color("#11223380"), Rgba::new(0x11, 0x22, 0x33, 0x80));
    }

    #[test]
    fn test_invalid_degrades_to_transparent() {
        assert_eq!(parse_hex_color(""), Rgba::TRANSPARENT);
        assert_eq!(parse_hex_color("#"), Rgba::TRANSPARENT);
        assert_eq!(parse_hex_color("#GGGGGG"), Rgba::TRANSPARENT);
        assert_eq!(parse_hex_color("#12345"), Rgba::TRANSPARENT);
        assert_eq!(parse_hex_color("#+1+2+3"), Rgba::TRANSPARENT);
        assert_eq!(parse_hex_color("ééé"), Rgba::TRANSPARENT);
    }
}

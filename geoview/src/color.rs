use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Color of a layer, a stroke or a popup element.
///
/// Colors are configured and handed to the map widget as CSS hex strings, so the type
/// serializes to and from `#RRGGBB` / `#RRGGBBAA`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid color: {value}"))
    }
}

impl From<Color> for String {
    fn from(val: Color) -> Self {
        val.to_hex()
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Color {
    /// Black color: `#000000`
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    /// White color: `#FFFFFF`
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Constructs color from its RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Constructs an opaque color from its RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Converts the color into a CSS hex string. Opaque colors are written as `#RRGGBB`, others
    /// as `#RRGGBBAA`.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Parses a CSS color: a hex string accepted by [`Color::try_from_hex`] or one of the basic
    /// named colors accepted by [`Color::from_css_name`].
    pub fn parse(value: &str) -> Option<Self> {
        Self::try_from_hex(value).or_else(|| Self::from_css_name(value))
    }

    /// Looks up a CSS named color. Only the basic keywords are known. Case is ignored.
    pub fn from_css_name(name: &str) -> Option<Self> {
        let color = match name.trim().to_ascii_lowercase().as_str() {
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "transparent" => Self::TRANSPARENT,
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "lime" => Self::rgb(0, 255, 0),
            "blue" => Self::rgb(0, 0, 255),
            "navy" => Self::rgb(0, 0, 128),
            "yellow" => Self::rgb(255, 255, 0),
            "orange" => Self::rgb(255, 165, 0),
            "purple" => Self::rgb(128, 0, 128),
            "fuchsia" | "magenta" => Self::rgb(255, 0, 255),
            "aqua" | "cyan" => Self::rgb(0, 255, 255),
            "teal" => Self::rgb(0, 128, 128),
            "olive" => Self::rgb(128, 128, 0),
            "maroon" => Self::rgb(128, 0, 0),
            "silver" => Self::rgb(192, 192, 192),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "brown" => Self::rgb(165, 42, 42),
            "pink" => Self::rgb(255, 192, 203),
            _ => return None,
        };

        Some(color)
    }

    /// Parses a color from a hex string: `#RGB`, `#RRGGBB` or `#RRGGBBAA`. Surrounding whitespace
    /// and letter case are ignored.
    pub fn try_from_hex(hex_string: &str) -> Option<Self> {
        let digits = hex_string.trim().strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();

        match digits.len() {
            3 => {
                let short = |i: usize| channel(i..i + 1).map(|v| v * 17);
                Some(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            6 => Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Some(Self::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Parses a color from the hex string at compile time. Only `#RRGGBB` and `#RRGGBBAA` are
    /// accepted.
    ///
    /// # Panics
    ///
    /// Panics if the parsing fails.
    pub const fn from_hex(hex_string: &'static str) -> Self {
        let bytes = hex_string.as_bytes();
        if bytes.len() != 7 && bytes.len() != 9 || bytes[0] != b'#' {
            panic!("Invalid color hex string");
        }

        let r = decode_byte(bytes[1], bytes[2]);
        let g = decode_byte(bytes[3], bytes[4]);
        let b = decode_byte(bytes[5], bytes[6]);
        let a = if bytes.len() == 9 {
            decode_byte(bytes[7], bytes[8])
        } else {
            255
        };

        Self { r, g, b, a }
    }

    /// Returns a new color instance, copied from the base one but with the given alpha channel.
    pub fn with_alpha(&self, a: u8) -> Self {
        Self { a, ..*self }
    }

    /// Red component of the color in RGBA space.
    pub fn r(&self) -> u8 {
        self.r
    }

    /// Green component of the color in RGBA space.
    pub fn g(&self) -> u8 {
        self.g
    }

    /// Blue component of the color in RGBA space.
    pub fn b(&self) -> u8 {
        self.b
    }

    /// Opacity component of the color.
    pub fn a(&self) -> u8 {
        self.a
    }

    /// Relative luminance of the color in `0.0..=1.0` (sRGB, ITU-R BT.709 weights). Alpha is
    /// ignored.
    pub fn luminance(&self) -> f64 {
        fn linear(channel: u8) -> f64 {
            let c = channel as f64 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }

        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }
}

const fn decode_byte(high: u8, low: u8) -> u8 {
    decode_char(high) * 16 + decode_char(low)
}

const fn decode_char(byte: u8) -> u8 {
    match byte {
        b'0'..=b'9' => byte - b'0',
        b'a'..=b'f' => byte - b'a' + 10,
        b'A'..=b'F' => byte - b'A' + 10,
        _ => panic!("Invalid hex character"),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn hex_formats() {
        assert_eq!(Color::try_from_hex("#10b981"), Some(Color::rgb(0x10, 0xB9, 0x81)));
        assert_eq!(Color::try_from_hex(" #FFF "), Some(Color::WHITE));
        assert_eq!(
            Color::try_from_hex("#FF1000AA"),
            Some(Color::rgba(0xFF, 0x10, 0x00, 0xAA))
        );
        assert_eq!(Color::try_from_hex("10b981"), None);
        assert_eq!(Color::try_from_hex("#12345"), None);
        assert_eq!(Color::try_from_hex("#zzzzzz"), None);
        assert_eq!(Color::try_from_hex("#ééé"), None);
    }

    #[test]
    fn color_serialization() {
        let color = Color::from_hex("#3B82F6");
        assert_eq!(color.to_hex(), "#3B82F6");
        assert_eq!(Color::from_hex("#FF1000AA").to_hex(), "#FF1000AA");

        let json = serde_json::to_string(&color).expect("serialize");
        assert_eq!(json, "\"#3B82F6\"");
        let parsed: Color = serde_json::from_str("\"#3b82f6\"").expect("deserialize");
        assert_eq!(parsed, color);
        assert!(serde_json::from_str::<Color>("\"bluish\"").is_err());
    }

    #[test]
    fn css_named_colors() {
        assert_eq!(Color::parse("white"), Some(Color::WHITE));
        assert_eq!(Color::parse(" Black "), Some(Color::BLACK));
        assert_eq!(Color::parse("grey"), Color::parse("gray"));
        assert_eq!(Color::parse("transparent").map(|c| c.a()), Some(0));
        assert_eq!(Color::parse("#10b981"), Some(Color::rgb(0x10, 0xB9, 0x81)));
        assert_eq!(Color::parse("rebeccapurple"), None);

        let parsed: Color = serde_json::from_str("\"orange\"").expect("deserialize");
        assert_eq!(parsed, Color::rgb(255, 165, 0));
        assert_eq!(serde_json::to_string(&parsed).expect("serialize"), "\"#FFA500\"");
    }

    #[test]
    fn luminance_bounds() {
        assert_relative_eq!(Color::BLACK.luminance(), 0.0);
        assert_relative_eq!(Color::WHITE.luminance(), 1.0, epsilon = 1e-9);
        assert!(Color::from_hex("#10B981").luminance() > 0.2);
    }
}

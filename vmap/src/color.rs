use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VmapError;

/// Color representation.
///
/// Colors are parsed from the CSS notations used in style definitions: `#RGB`, `#RRGGBB`,
/// `#RRGGBBAA` (the leading `#` is optional), `rgb(r, g, b)` and `rgba(r, g, b, a)` with alpha
/// in the `0..=1` range.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl TryFrom<String> for Color {
    type Error = VmapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(val: Color) -> Self {
        val.to_css()
    }
}

impl FromStr for Color {
    type Err = VmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| VmapError::InvalidStyle(format!("invalid color: {s}")))
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl Color {
    /// Transparent color: `#00000000`
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    /// White color: `#FFFFFFFF`
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    /// Black color: `#000000FF`
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);

    /// Constructs color from its RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Constructs an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Constructs color from RGB channels and opacity in the `0..=1` range.
    pub fn with_opacity(r: u8, g: u8, b: u8, opacity: f64) -> Self {
        Self::rgba(r, g, b, opacity_to_alpha(opacity))
    }

    /// Converts the color into u8 array (RGBA).
    pub fn to_u8_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Converts the color into HEX8 string: `#RRGGBBAA`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// Converts the color into CSS notation: `#RRGGBB` for opaque colors, `rgba(r,g,b,a)` for
    /// others.
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            let opacity = (self.opacity() * 100.0).round() / 100.0;
            format!("rgba({},{},{},{opacity})", self.r, self.g, self.b)
        }
    }

    /// Parses a color from any of the supported notations.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(args) = value
            .strip_prefix("rgba(")
            .and_then(|v| v.strip_suffix(')'))
        {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            let [r, g, b, a] = parts.as_slice() else {
                return None;
            };

            let opacity: f64 = a.parse().ok()?;
            return Some(Self::with_opacity(
                r.parse().ok()?,
                g.parse().ok()?,
                b.parse().ok()?,
                opacity,
            ));
        }

        if let Some(args) = value.strip_prefix("rgb(").and_then(|v| v.strip_suffix(')')) {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            let [r, g, b] = parts.as_slice() else {
                return None;
            };

            return Some(Self::rgb(r.parse().ok()?, g.parse().ok()?, b.parse().ok()?));
        }

        Self::try_from_hex(value)
    }

    /// Parses a color from the hex string: HEX3 (`#RGB`), HEX6 (`#RRGGBB`) or HEX8
    /// (`#RRGGBBAA`). The `#` prefix is optional.
    pub fn try_from_hex(hex_string: &str) -> Option<Self> {
        let hex = hex_string.strip_prefix('#').unwrap_or(hex_string);
        if !hex.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        let short = |index: usize| channel(index..index + 1).map(|v| v * 17);

        match hex.len() {
            3 => Some(Self::rgb(short(0)?, short(1)?, short(2)?)),
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

    /// Opacity in the `0..=1` range.
    pub fn opacity(&self) -> f64 {
        self.a as f64 / 255.0
    }
}

fn opacity_to_alpha(opacity: f64) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

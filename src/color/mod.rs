//! Hex/HSL color representation and the derived-color helpers built on it.

mod adjust;

use std::{fmt, str::FromStr};

use palette::{FromColor, Hsl, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::ColorError;

pub use self::adjust::{adjust_to_luminance, cap_saturation, darken_hex, lighten_hex, luminance};

/// An opaque sRGB color, always rendered as `#rrggbb` in lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    r: u8,
    g: u8,
    b: u8,
}

/// HSL triple using CSS scales: hue in `[0, 360)`, saturation and lightness in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HslColor {
    /// Hue in degrees.
    pub hue: f32,
    /// Saturation percentage.
    pub saturation: f32,
    /// Lightness percentage.
    pub lightness: f32,
}

impl HexColor {
    /// Pure white.
    pub const WHITE: HexColor = HexColor::from_rgb(0xff, 0xff, 0xff);
    /// Pure black.
    pub const BLACK: HexColor = HexColor::from_rgb(0, 0, 0);

    /// Build a color from its 8-bit channels.
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional). Shorthand and alpha forms are rejected.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let digits = input.strip_prefix('#').unwrap_or(input);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidColorFormat {
                input: input.to_owned(),
            });
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ColorError::InvalidColorFormat {
                input: input.to_owned(),
            })
        };

        Ok(Self::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Red channel.
    pub const fn r(self) -> u8 {
        self.r
    }

    /// Green channel.
    pub const fn g(self) -> u8 {
        self.g
    }

    /// Blue channel.
    pub const fn b(self) -> u8 {
        self.b
    }

    /// Channels as an array, in RGB order.
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Convert to HSL.
    pub fn to_hsl(self) -> HslColor {
        let hsl: Hsl = Hsl::from_color(self.to_srgb());
        let hue = hsl.hue.into_positive_degrees();
        HslColor {
            hue: if hue >= 360.0 { 0.0 } else { hue },
            saturation: hsl.saturation * 100.0,
            lightness: hsl.lightness * 100.0,
        }
    }

    /// Convert from HSL. Hue wraps modulo 360; saturation and lightness are clamped to `[0, 100]`.
    pub fn from_hsl(hsl: HslColor) -> Self {
        let hue = hsl.hue.rem_euclid(360.0);
        let saturation = hsl.saturation.clamp(0.0, 100.0) / 100.0;
        let lightness = hsl.lightness.clamp(0.0, 100.0) / 100.0;
        let hsl: Hsl = Hsl::new(hue, saturation, lightness);
        let rgb: Srgb = Srgb::from_color(hsl);
        Self::from_unit(rgb.red, rgb.green, rgb.blue)
    }

    /// Build from floating point channels on a 0..=255 scale, rounding and clamping each.
    pub fn from_channels_f32(channels: [f32; 3]) -> Self {
        let [r, g, b] = channels.map(to_byte);
        Self::from_rgb(r, g, b)
    }

    fn from_unit(r: f32, g: f32, b: f32) -> Self {
        Self::from_channels_f32([r * 255.0, g * 255.0, b * 255.0])
    }

    fn to_srgb(self) -> Srgb<f32> {
        Srgb::new(self.r, self.g, self.b).into_format()
    }
}

fn to_byte(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.to_string()
    }
}

/// Parse a hex color and convert it to HSL.
pub fn hex_to_hsl(hex: &str) -> Result<HslColor, ColorError> {
    HexColor::parse(hex).map(HexColor::to_hsl)
}

/// Convert an HSL triple back to a hex color.
pub fn hsl_to_hex(hue: f32, saturation: f32, lightness: f32) -> HexColor {
    HexColor::from_hsl(HslColor {
        hue,
        saturation,
        lightness,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_distance(a: HexColor, b: HexColor) -> u8 {
        a.channels()
            .iter()
            .zip(b.channels())
            .map(|(x, y)| x.abs_diff(y))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn parse_accepts_with_and_without_hash() {
        assert_eq!(
            HexColor::parse("#5A3dFF").unwrap(),
            HexColor::from_rgb(0x5a, 0x3d, 0xff)
        );
        assert_eq!(
            HexColor::parse("5a3dff").unwrap(),
            HexColor::from_rgb(0x5a, 0x3d, 0xff)
        );
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for input in ["", "#", "#fff", "#ff00ff00", "#gg0000", "ff 000", "#ff00f"] {
            let err = HexColor::parse(input).unwrap_err();
            assert_eq!(
                err,
                ColorError::InvalidColorFormat {
                    input: input.to_owned()
                }
            );
        }
    }

    #[test]
    fn display_is_lowercase_with_hash() {
        let color = HexColor::parse("#ABCDEF").unwrap();
        assert_eq!(color.to_string(), "#abcdef");
    }

    #[test]
    fn serde_uses_hex_strings() {
        let color = HexColor::from_rgb(1, 2, 3);
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"#010203\"");
        let back: HexColor = serde_json::from_str("\"#010203\"").unwrap();
        assert_eq!(back, color);
        assert!(serde_json::from_str::<HexColor>("\"nope\"").is_err());
    }

    #[test]
    fn known_conversions() {
        let red = hex_to_hsl("#ff0000").unwrap();
        assert!(red.hue.abs() < 0.01);
        assert!((red.saturation - 100.0).abs() < 0.01);
        assert!((red.lightness - 50.0).abs() < 0.01);

        let gray = hex_to_hsl("#808080").unwrap();
        assert!(gray.saturation.abs() < 0.01);

        assert_eq!(hsl_to_hex(120.0, 100.0, 50.0).to_string(), "#00ff00");
        assert_eq!(hsl_to_hex(240.0, 100.0, 50.0).to_string(), "#0000ff");
    }

    #[test]
    fn hsl_to_hex_wraps_hue_and_clamps() {
        assert_eq!(hsl_to_hex(480.0, 100.0, 50.0), hsl_to_hex(120.0, 100.0, 50.0));
        assert_eq!(hsl_to_hex(-120.0, 100.0, 50.0), hsl_to_hex(240.0, 100.0, 50.0));
        assert_eq!(hsl_to_hex(0.0, 250.0, 50.0), hsl_to_hex(0.0, 100.0, 50.0));
        assert_eq!(hsl_to_hex(0.0, 50.0, 140.0), HexColor::WHITE);
        assert_eq!(hsl_to_hex(0.0, 50.0, -3.0), HexColor::BLACK);
    }

    #[test]
    fn hex_round_trips_within_one_per_channel() {
        for r in (0..=255u16).step_by(17) {
            for g in (0..=255u16).step_by(51) {
                for b in (0..=255u16).step_by(15) {
                    let color = HexColor::from_rgb(r as u8, g as u8, b as u8);
                    let back = HexColor::from_hsl(color.to_hsl());
                    assert!(
                        channel_distance(color, back) <= 1,
                        "{color} came back as {back}"
                    );
                }
            }
        }
    }

    #[test]
    fn hsl_round_trips_saturation_and_lightness() {
        for hue in [0.0f32, 37.0, 120.0, 211.0, 300.0] {
            for saturation in [50.0f32, 75.0, 100.0] {
                for lightness in [40.0f32, 50.0, 60.0] {
                    let back = hsl_to_hex(hue, saturation, lightness).to_hsl();
                    assert!((back.lightness - lightness).abs() <= 1.0);
                    assert!((back.saturation - saturation).abs() <= 1.0);
                    let hue_diff = (back.hue - hue).abs();
                    assert!(hue_diff.min(360.0 - hue_diff) <= 1.0);
                }
            }
        }
    }
}

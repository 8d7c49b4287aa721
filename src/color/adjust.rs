use super::{HexColor, HslColor};

/// Multiply every channel by `factor` (< 1 darkens), clamping to `[0, 255]`.
pub fn darken_hex(color: HexColor, factor: f32) -> HexColor {
    scale_channels(color, factor)
}

/// Multiply every channel by `factor` (> 1 lightens), clamping to `[0, 255]`.
pub fn lighten_hex(color: HexColor, factor: f32) -> HexColor {
    scale_channels(color, factor)
}

/// Weighted luminance `0.299r + 0.587g + 0.114b` on a 0..=100 scale.
pub fn luminance(color: HexColor) -> f32 {
    let [r, g, b] = color.channels().map(f32::from);
    (0.299 * r + 0.587 * g + 0.114 * b) / 255.0 * 100.0
}

/// Rescale the channels so the weighted luminance approaches `target` (0..=100).
///
/// Black has no luminance to rescale and is returned unchanged.
pub fn adjust_to_luminance(color: HexColor, target: f32) -> HexColor {
    let current = luminance(color);
    if current == 0.0 {
        return color;
    }
    scale_channels(color, target / current)
}

/// Clamp the HSL saturation of `color` to at most `cap` percent.
pub fn cap_saturation(color: HexColor, cap: f32) -> HexColor {
    let hsl = color.to_hsl();
    if hsl.saturation <= cap {
        return color;
    }
    HexColor::from_hsl(HslColor {
        saturation: cap.max(0.0),
        ..hsl
    })
}

fn scale_channels(color: HexColor, factor: f32) -> HexColor {
    HexColor::from_channels_f32(color.channels().map(|c| f32::from(c) * factor))
}

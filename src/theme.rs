//! Derivation of the full UI palette from one dominant color.

use serde::{Deserialize, Serialize};

use crate::{
    color::{HexColor, adjust_to_luminance, cap_saturation, darken_hex, lighten_hex},
    error::ColorError,
};

/// Colors whose derived header would look broken; these get the neutral header instead.
pub const DEFAULT_HEADER_DENYLIST: [HexColor; 3] = [
    HexColor::WHITE,
    HexColor::BLACK,
    crate::config::DEFAULT_FALLBACK_COLOR,
];
/// Header background used for denylisted dominant colors.
pub const DEFAULT_NEUTRAL_HEADER: HexColor = HexColor::from_rgb(0xf3, 0xf4, 0xf6);

/// Read-only bundle of colors derived from a single dominant color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemePalette {
    /// Inner flap of the envelope, only visible while opening.
    pub hidden_flap: HexColor,
    /// Card header background.
    pub header_background: HexColor,
    /// Primary light tint.
    pub base_tint: HexColor,
    /// Secondary, slightly darker tint.
    pub secondary_tint: HexColor,
    /// Dark overlay used for shadows and borders.
    pub overlay_dark: HexColor,
    /// Base color of the background grid cells.
    pub grid_cell_base: HexColor,
    /// Left edge of the progress gradient.
    pub progress_start: HexColor,
    /// Right edge of the progress gradient.
    pub progress_end: HexColor,
}

/// Caller-supplied values that win over the derived ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ThemeOverrides {
    /// Explicit header background.
    pub header_background: Option<HexColor>,
}

/// Denylist policy for the header background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemePolicy {
    /// Dominant colors that fall back to [`ThemePolicy::neutral_header`].
    pub denylist: Vec<HexColor>,
    /// Neutral header background for denylisted colors.
    pub neutral_header: HexColor,
}

impl Default for ThemePolicy {
    fn default() -> Self {
        Self {
            denylist: DEFAULT_HEADER_DENYLIST.to_vec(),
            neutral_header: DEFAULT_NEUTRAL_HEADER,
        }
    }
}

impl ThemePolicy {
    /// Default policy whose placeholder entry is `fallback`, so failed extractions get the
    /// neutral header.
    pub fn for_fallback(fallback: HexColor) -> Self {
        Self {
            denylist: vec![HexColor::WHITE, HexColor::BLACK, fallback],
            neutral_header: DEFAULT_NEUTRAL_HEADER,
        }
    }

    /// Whether `color` is one of the degenerate dominant colors.
    pub fn is_denied(&self, color: HexColor) -> bool {
        self.denylist.contains(&color)
    }
}

/// Expand `dominant` into a [`ThemePalette`].
pub fn get_theme_palette(
    dominant: HexColor,
    overrides: &ThemeOverrides,
    policy: &ThemePolicy,
) -> ThemePalette {
    let header_background = overrides.header_background.unwrap_or_else(|| {
        if policy.is_denied(dominant) {
            policy.neutral_header
        } else {
            cap_saturation(adjust_to_luminance(dominant, 100.0), 5.0)
        }
    });

    ThemePalette {
        hidden_flap: cap_saturation(lighten_hex(dominant, 4.0), 100.0),
        header_background,
        base_tint: cap_saturation(adjust_to_luminance(dominant, 85.0), 70.0),
        secondary_tint: cap_saturation(lighten_hex(dominant, 1.25), 65.0),
        overlay_dark: cap_saturation(darken_hex(dominant, 0.7), 90.0),
        grid_cell_base: cap_saturation(adjust_to_luminance(header_background, 95.0), 95.0),
        progress_start: cap_saturation(adjust_to_luminance(dominant, 60.0), 50.0),
        progress_end: cap_saturation(lighten_hex(dominant, 1.2), 50.0),
    }
}

/// String entry point: malformed input is a caller bug and is reported as such.
pub fn theme_palette_from_hex(
    dominant: &str,
    overrides: &ThemeOverrides,
    policy: &ThemePolicy,
) -> Result<ThemePalette, ColorError> {
    let dominant = HexColor::parse(dominant)?;
    Ok(get_theme_palette(dominant, overrides, policy))
}

impl ThemePalette {
    /// Colors handed to the confetti burst so it matches the card.
    pub fn confetti_palette(&self) -> Vec<HexColor> {
        vec![
            self.base_tint,
            self.secondary_tint,
            self.overlay_dark,
            self.progress_start,
            self.progress_end,
        ]
    }

    /// Progress bar color at `fraction` (clamped to `[0, 1]`), interpolated in RGB.
    pub fn progress_color_at(&self, fraction: f32) -> HexColor {
        let t = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let start = self.progress_start.channels().map(f32::from);
        let end = self.progress_end.channels().map(f32::from);
        HexColor::from_channels_f32([0, 1, 2].map(|i| start[i] + (end[i] - start[i]) * t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(value: &str) -> HexColor {
        HexColor::parse(value).unwrap()
    }

    #[test]
    fn vivid_color_gets_derived_low_saturation_header() {
        let palette = theme_palette_from_hex(
            "#5a3dff",
            &ThemeOverrides::default(),
            &ThemePolicy::default(),
        )
        .unwrap();

        assert_ne!(palette.header_background, DEFAULT_NEUTRAL_HEADER);
        assert_ne!(palette.header_background, HexColor::WHITE);
        assert!(palette.header_background.to_hsl().saturation <= 5.0 + 1.5);
    }

    #[test]
    fn denylisted_colors_use_neutral_header() {
        let policy = ThemePolicy::default();
        for dominant in [HexColor::WHITE, HexColor::BLACK] {
            let palette = get_theme_palette(dominant, &ThemeOverrides::default(), &policy);
            assert_eq!(palette.header_background, DEFAULT_NEUTRAL_HEADER);
        }
    }

    #[test]
    fn denylist_is_configurable() {
        let policy = ThemePolicy {
            denylist: vec![hex("#5a3dff")],
            neutral_header: hex("#eeeeee"),
        };
        let palette = get_theme_palette(hex("#5a3dff"), &ThemeOverrides::default(), &policy);
        assert_eq!(palette.header_background, hex("#eeeeee"));

        let palette = get_theme_palette(HexColor::WHITE, &ThemeOverrides::default(), &policy);
        assert_ne!(palette.header_background, hex("#eeeeee"));
    }

    #[test]
    fn override_wins_and_feeds_grid_cells() {
        let overrides = ThemeOverrides {
            header_background: Some(hex("#102030")),
        };
        let palette = get_theme_palette(HexColor::WHITE, &overrides, &ThemePolicy::default());
        assert_eq!(palette.header_background, hex("#102030"));
        assert_eq!(
            palette.grid_cell_base,
            cap_saturation(adjust_to_luminance(hex("#102030"), 95.0), 95.0)
        );
    }

    #[test]
    fn derived_colors_respect_saturation_caps() {
        let palette = get_theme_palette(
            hex("#ff1744"),
            &ThemeOverrides::default(),
            &ThemePolicy::default(),
        );
        let eps = 1.5;
        assert!(palette.base_tint.to_hsl().saturation <= 70.0 + eps);
        assert!(palette.secondary_tint.to_hsl().saturation <= 65.0 + eps);
        assert!(palette.overlay_dark.to_hsl().saturation <= 90.0 + eps);
        assert!(palette.progress_start.to_hsl().saturation <= 50.0 + eps);
        assert!(palette.progress_end.to_hsl().saturation <= 50.0 + eps);
    }

    #[test]
    fn invalid_hex_is_reported() {
        let err = theme_palette_from_hex("#12", &ThemeOverrides::default(), &ThemePolicy::default())
            .unwrap_err();
        assert!(matches!(err, ColorError::InvalidColorFormat { .. }));
    }

    #[test]
    fn progress_interpolates_between_ends() {
        let palette = get_theme_palette(
            hex("#3366cc"),
            &ThemeOverrides::default(),
            &ThemePolicy::default(),
        );
        assert_eq!(palette.progress_color_at(0.0), palette.progress_start);
        assert_eq!(palette.progress_color_at(1.0), palette.progress_end);
        assert_eq!(palette.progress_color_at(7.0), palette.progress_end);
        assert_eq!(palette.progress_color_at(-1.0), palette.progress_start);
        assert_eq!(palette.confetti_palette().len(), 5);
    }
}

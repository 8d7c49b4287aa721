//! Application-level configuration loading: fallback accent, header policy, cache and animation tuning.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    animation::{blob::BlobConfig, confetti::ConfettiConfig},
    color::HexColor,
    theme::{DEFAULT_NEUTRAL_HEADER, ThemePolicy},
};

/// Default location on disk where the tool looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "GIFT_THEME_CONFIG_PATH";
/// Default durable cache file.
const DEFAULT_CACHE_PATH: &str = "target/gift-theme/colors.json";
/// Accent color used whenever an extraction fails.
pub const DEFAULT_FALLBACK_COLOR: HexColor = HexColor::from_rgb(0x63, 0x66, 0xf1);
/// Long edge, in pixels, images are downscaled to before sampling.
pub const DEFAULT_TARGET_EDGE: u32 = 128;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    fallback_color: HexColor,
    theme_policy: ThemePolicy,
    target_edge: u32,
    cache_path: Option<PathBuf>,
    blob: BlobConfig,
    confetti: ConfettiConfig,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        fallback = %app_config.fallback_color,
                        "loaded theme config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a configuration document; absent fields keep their defaults.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Accent used when the dominant color cannot be extracted.
    pub fn fallback_color(&self) -> HexColor {
        self.fallback_color
    }

    /// Header denylist policy for theme derivation.
    pub fn theme_policy(&self) -> &ThemePolicy {
        &self.theme_policy
    }

    /// Long edge images are downscaled to before clustering.
    pub fn target_edge(&self) -> u32 {
        self.target_edge
    }

    /// Location of the JSON durable cache, if persistence is enabled.
    pub fn cache_path(&self) -> Option<&PathBuf> {
        self.cache_path.as_ref()
    }

    /// Ambient blob tuning.
    pub fn blob(&self) -> &BlobConfig {
        &self.blob
    }

    /// Confetti burst tuning.
    pub fn confetti(&self) -> &ConfettiConfig {
        &self.confetti
    }

    /// Replace the fallback accent.
    /// The denylisted placeholder follows the new accent.
    pub fn with_fallback_color(mut self, color: HexColor) -> Self {
        let previous = self.fallback_color;
        for entry in &mut self.theme_policy.denylist {
            if *entry == previous {
                *entry = color;
            }
        }
        self.fallback_color = color;
        self
    }

    /// Disable or relocate the durable cache file.
    pub fn with_cache_path(mut self, path: Option<PathBuf>) -> Self {
        self.cache_path = path;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fallback_color: DEFAULT_FALLBACK_COLOR,
            theme_policy: ThemePolicy::default(),
            target_edge: DEFAULT_TARGET_EDGE,
            cache_path: Some(PathBuf::from(DEFAULT_CACHE_PATH)),
            blob: BlobConfig::default(),
            confetti: ConfettiConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    fallback_color: Option<HexColor>,
    header_denylist: Option<Vec<HexColor>>,
    neutral_header: Option<HexColor>,
    target_edge: Option<u32>,
    /// `null` disables the durable cache; absent keeps the default path.
    #[serde(deserialize_with = "deserialize_cache_path")]
    cache_path: Option<Option<PathBuf>>,
    blob: Option<BlobConfig>,
    confetti: Option<ConfettiConfig>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        let fallback_color = value.fallback_color.unwrap_or(defaults.fallback_color);
        Self {
            fallback_color,
            theme_policy: ThemePolicy {
                denylist: value
                    .header_denylist
                    .unwrap_or_else(|| ThemePolicy::for_fallback(fallback_color).denylist),
                neutral_header: value.neutral_header.unwrap_or(DEFAULT_NEUTRAL_HEADER),
            },
            target_edge: value
                .target_edge
                .filter(|edge| *edge > 0)
                .unwrap_or(defaults.target_edge),
            cache_path: value.cache_path.unwrap_or(defaults.cache_path),
            blob: value.blob.unwrap_or(defaults.blob),
            confetti: value.confetti.unwrap_or(defaults.confetti),
        }
    }
}

fn deserialize_cache_path<'de, D>(deserializer: D) -> Result<Option<Option<PathBuf>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<PathBuf>::deserialize(deserializer).map(Some)
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{ThemeOverrides, get_theme_palette};

    #[test]
    fn empty_document_keeps_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.fallback_color(), DEFAULT_FALLBACK_COLOR);
        assert_eq!(config.target_edge(), DEFAULT_TARGET_EDGE);
        assert_eq!(config.theme_policy(), &ThemePolicy::default());
        assert_eq!(
            config.cache_path(),
            Some(&PathBuf::from(DEFAULT_CACHE_PATH))
        );
    }

    #[test]
    fn fields_override_defaults() {
        let config = AppConfig::from_json(
            r##"{
                "fallback_color": "#112233",
                "header_denylist": ["#ffffff"],
                "neutral_header": "#eeeeee",
                "target_edge": 64,
                "cache_path": null,
                "blob": { "count": 4 },
                "confetti": { "particle_count": 10 }
            }"##,
        )
        .unwrap();

        assert_eq!(config.fallback_color().to_string(), "#112233");
        assert_eq!(config.theme_policy().denylist, vec![HexColor::WHITE]);
        assert_eq!(config.theme_policy().neutral_header.to_string(), "#eeeeee");
        assert_eq!(config.target_edge(), 64);
        assert_eq!(config.cache_path(), None);
        assert_eq!(config.blob().count, 4);
        assert_eq!(config.confetti().particle_count, 10);
    }

    #[test]
    fn custom_fallback_is_denylisted_by_default() {
        let config = AppConfig::from_json(r##"{ "fallback_color": "#112233" }"##).unwrap();
        let fallback = config.fallback_color();
        assert_eq!(
            config.theme_policy().denylist,
            vec![HexColor::WHITE, HexColor::BLACK, fallback]
        );

        let palette = get_theme_palette(fallback, &ThemeOverrides::default(), config.theme_policy());
        assert_eq!(palette.header_background, DEFAULT_NEUTRAL_HEADER);
    }

    #[test]
    fn replacing_the_fallback_moves_the_placeholder() {
        let accent = HexColor::from_rgb(0x11, 0x22, 0x33);
        let config = AppConfig::default().with_fallback_color(accent);
        assert!(config.theme_policy().is_denied(accent));
        assert!(!config.theme_policy().is_denied(DEFAULT_FALLBACK_COLOR));
    }

    #[test]
    fn malformed_colors_are_rejected() {
        assert!(AppConfig::from_json(r#"{ "fallback_color": "blue" }"#).is_err());
    }

    #[test]
    fn zero_target_edge_is_ignored() {
        let config = AppConfig::from_json(r#"{ "target_edge": 0 }"#).unwrap();
        assert_eq!(config.target_edge(), DEFAULT_TARGET_EDGE);
    }
}

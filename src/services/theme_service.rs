use crate::{
    animation::{BlobSet, ConfettiConfig, generate_blob_set},
    services::extraction_service::dominant_color,
    state::SharedState,
    theme::{ThemeOverrides, ThemePalette, get_theme_palette},
};

/// Derive the full card palette for an image.
pub async fn palette_for_image(
    state: &SharedState,
    image_ref: &str,
    overrides: &ThemeOverrides,
) -> ThemePalette {
    let dominant = dominant_color(state, image_ref).await;
    get_theme_palette(dominant, overrides, state.config().theme_policy())
}

/// Ambient blobs tinted with the image's dominant color.
pub async fn blob_set_for_image(state: &SharedState, image_ref: &str, seed: u64) -> BlobSet {
    let dominant = dominant_color(state, image_ref).await;
    generate_blob_set(dominant, seed, state.config().blob())
}

/// Configured confetti tuning recolored with the palette's confetti colors.
pub fn confetti_config_for(state: &SharedState, palette: &ThemePalette) -> ConfettiConfig {
    state
        .config()
        .confetti()
        .clone()
        .with_palette(palette.confetti_palette())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::{self, BoxFuture};
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::{
        color::HexColor,
        config::AppConfig,
        error::ExtractError,
        extract::ImageDecoder,
        state::ThemeState,
        theme::DEFAULT_NEUTRAL_HEADER,
    };

    struct SolidDecoder;

    impl ImageDecoder for SolidDecoder {
        fn decode(
            &self,
            image_ref: &str,
            _target_edge: u32,
        ) -> BoxFuture<'static, Result<RgbaImage, ExtractError>> {
            let result = match image_ref {
                "rose.png" => Ok(RgbaImage::from_pixel(16, 16, Rgba([0xe1, 0x1d, 0x48, 255]))),
                other => Err(ExtractError::image_load(other, "unreadable")),
            };
            Box::pin(future::ready(result))
        }
    }

    fn state() -> SharedState {
        ThemeState::new(
            AppConfig::default().with_cache_path(None),
            Arc::new(SolidDecoder),
            None,
        )
    }

    #[tokio::test]
    async fn palette_follows_the_dominant_color() {
        let state = state();
        let palette = palette_for_image(&state, "rose.png", &ThemeOverrides::default()).await;
        let expected = get_theme_palette(
            HexColor::from_rgb(0xe1, 0x1d, 0x48),
            &ThemeOverrides::default(),
            state.config().theme_policy(),
        );
        assert_eq!(palette, expected);
        assert_ne!(palette.header_background, DEFAULT_NEUTRAL_HEADER);
    }

    #[tokio::test]
    async fn failed_extraction_themes_with_neutral_header() {
        let state = state();
        let palette = palette_for_image(&state, "broken.png", &ThemeOverrides::default()).await;
        // The fallback accent is on the default denylist.
        assert_eq!(palette.header_background, DEFAULT_NEUTRAL_HEADER);
    }

    #[tokio::test]
    async fn blobs_are_tinted_from_the_image() {
        let state = state();
        let set = blob_set_for_image(&state, "rose.png", 3).await;
        assert_eq!(set.base, HexColor::from_rgb(0xe1, 0x1d, 0x48));
        assert_eq!(set.blobs.len(), state.config().blob().count);
    }

    #[tokio::test]
    async fn confetti_uses_the_theme_colors() {
        let state = state();
        let palette = palette_for_image(&state, "rose.png", &ThemeOverrides::default()).await;
        let config = confetti_config_for(&state, &palette);
        assert_eq!(config.palette, palette.confetti_palette());
        assert_eq!(config.particle_count, state.config().confetti().particle_count);
    }
}

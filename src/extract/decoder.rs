use futures::future::BoxFuture;
use image::{RgbaImage, imageops};

use crate::error::ExtractError;

/// Loads an image reference into an RGBA buffer whose long edge is at most `target_edge`.
pub trait ImageDecoder: Send + Sync {
    /// Decode and downscale `image_ref`.
    fn decode(
        &self,
        image_ref: &str,
        target_edge: u32,
    ) -> BoxFuture<'static, Result<RgbaImage, ExtractError>>;
}

/// Decodes local files (plain paths or `file://` URIs) on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageDecoder;

impl ImageDecoder for FsImageDecoder {
    fn decode(
        &self,
        image_ref: &str,
        target_edge: u32,
    ) -> BoxFuture<'static, Result<RgbaImage, ExtractError>> {
        let image_ref = image_ref.to_owned();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                let path = image_ref.strip_prefix("file://").unwrap_or(&image_ref);
                let decoded = image::open(path)
                    .map_err(|source| ExtractError::image_load(image_ref.as_str(), source))?;
                Ok(downscale(decoded.to_rgba8(), target_edge))
            })
            .await
            .map_err(ExtractError::Worker)?
        })
    }
}

/// Shrink `image` so its longer side is `target_edge`, preserving aspect ratio. Never upscales.
pub fn downscale(image: RgbaImage, target_edge: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let long_edge = width.max(height);
    if target_edge == 0 || long_edge <= target_edge {
        return image;
    }

    let scale = target_edge as f32 / long_edge as f32;
    let new_width = ((width as f32) * scale).round().max(1.0) as u32;
    let new_height = ((height as f32) * scale).round().max(1.0) as u32;
    imageops::resize(&image, new_width, new_height, imageops::FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    #[test]
    fn downscale_preserves_aspect_ratio() {
        let image = RgbaImage::from_pixel(512, 256, Rgba([10, 20, 30, 255]));
        let small = downscale(image, 128);
        assert_eq!(small.dimensions(), (128, 64));
    }

    #[test]
    fn downscale_never_upscales() {
        let image = RgbaImage::from_pixel(40, 90, Rgba([10, 20, 30, 255]));
        assert_eq!(downscale(image, 128).dimensions(), (40, 90));
    }

    #[test]
    fn thin_images_keep_at_least_one_pixel() {
        let image = RgbaImage::from_pixel(1000, 2, Rgba([10, 20, 30, 255]));
        assert_eq!(downscale(image, 128).dimensions(), (128, 1));
    }

    #[tokio::test]
    async fn missing_file_is_an_image_load_error() {
        let err = FsImageDecoder
            .decode("file:///definitely/not/here.png", 128)
            .await
            .unwrap_err();
        match err {
            ExtractError::ImageLoad { image_ref, .. } => {
                assert_eq!(image_ref, "file:///definitely/not/here.png")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn decodes_and_downscales_png_from_disk() {
        let path = std::env::temp_dir().join(format!("gift-theme-decode-{}.png", std::process::id()));
        RgbaImage::from_pixel(300, 150, Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let decoded = FsImageDecoder
            .decode(path.to_str().unwrap(), 128)
            .await
            .unwrap();
        assert_eq!(decoded.dimensions(), (128, 64));
        assert_eq!(decoded.get_pixel(10, 10).0, [255, 0, 0, 255]);

        let _ = std::fs::remove_file(path);
    }
}

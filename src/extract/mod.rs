//! Dominant color extraction: pixel filtering, saturation-weighted k-means and centroid scoring.

mod decoder;
/// Saturation-weighted k-means over pixel samples.
pub mod kmeans;

use image::RgbaImage;
use rand::Rng;

use crate::{color::HexColor, error::ExtractError};

pub use self::decoder::{FsImageDecoder, ImageDecoder, downscale};
use self::kmeans::{Sample, adaptive_k, best_centroid, cluster};

/// Pixels less opaque than this (~78%) are ignored.
pub const MIN_ALPHA: u8 = 200;
/// Near-white cutoff, in lightness percent.
pub const MAX_LIGHTNESS: f32 = 95.0;
/// Near-black cutoff, in lightness percent.
pub const MIN_LIGHTNESS: f32 = 6.0;
/// Near-gray cutoff, in saturation percent.
pub const MIN_SATURATION: f32 = 8.0;

/// Summarise `image` as one representative color.
///
/// Background-looking pixels (translucent, near white, near black, near gray) are discarded and
/// the rest clustered; if nothing survives the filter the plain average of the whole image is
/// returned instead. The image is expected to be downscaled already.
pub fn extract_dominant_color<R: Rng + ?Sized>(
    image: &RgbaImage,
    rng: &mut R,
) -> Result<HexColor, ExtractError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExtractError::EmptyImage {
            image_ref: String::from("<buffer>"),
        });
    }

    let samples = brand_samples(image);
    if samples.is_empty() {
        return Ok(average_color(image));
    }

    let centroids = cluster(&samples, adaptive_k(samples.len()), rng);
    Ok(best_centroid(&centroids)
        .map(HexColor::from_channels_f32)
        .unwrap_or_else(|| average_color(image)))
}

/// Pixels that plausibly carry brand color, weighted by saturation.
fn brand_samples(image: &RgbaImage) -> Vec<Sample> {
    image
        .pixels()
        .filter(|pixel| pixel.0[3] >= MIN_ALPHA)
        .filter_map(|pixel| {
            let [r, g, b, _] = pixel.0;
            let hsl = HexColor::from_rgb(r, g, b).to_hsl();
            let keep = hsl.lightness <= MAX_LIGHTNESS
                && hsl.lightness >= MIN_LIGHTNESS
                && hsl.saturation >= MIN_SATURATION;
            keep.then(|| Sample::new([r, g, b], hsl.saturation / 100.0))
        })
        .collect()
}

/// Unweighted mean RGB over every pixel.
fn average_color(image: &RgbaImage) -> HexColor {
    let mut totals = [0u64; 3];
    for pixel in image.pixels() {
        for (total, channel) in totals.iter_mut().zip(&pixel.0[..3]) {
            *total += u64::from(*channel);
        }
    }
    let count = u64::from(image.width()) * u64::from(image.height());
    HexColor::from_channels_f32(totals.map(|total| total as f32 / count.max(1) as f32))
}

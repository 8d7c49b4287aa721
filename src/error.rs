//! Error types shared across the color and extraction layers.

use std::error::Error;

use thiserror::Error;

/// Errors raised by the color-space utilities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input was not a six digit hexadecimal color.
    #[error("invalid color format: `{input}` (expected #rrggbb)")]
    InvalidColorFormat {
        /// The rejected input, verbatim.
        input: String,
    },
}

/// Errors that can occur while extracting the dominant color of an image.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The image reference could not be loaded or decoded.
    #[error("failed to load image `{image_ref}`")]
    ImageLoad {
        /// Reference that failed.
        image_ref: String,
        /// Decoder failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The decoded image has no pixels to sample.
    #[error("image `{image_ref}` has no pixels")]
    EmptyImage {
        /// Reference of the empty image.
        image_ref: String,
    },
    /// The background worker running the extraction died.
    #[error("extraction worker failed")]
    Worker(#[source] tokio::task::JoinError),
}

impl ExtractError {
    /// Construct an image load error from any decoder failure.
    pub fn image_load(
        image_ref: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        ExtractError::ImageLoad {
            image_ref: image_ref.into(),
            source: source.into(),
        }
    }
}

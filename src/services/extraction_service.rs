use std::{
    hash::{DefaultHasher, Hash, Hasher},
    sync::Arc,
};

use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    color::HexColor,
    error::ExtractError,
    extract::extract_dominant_color,
    state::SharedState,
};

/// Where a resolved dominant color came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSource {
    /// Served from one of the cache tiers.
    Cache,
    /// Freshly extracted (and now cached).
    Extracted,
    /// Extraction failed; the configured fallback accent was used and nothing was cached.
    Fallback,
}

/// Outcome of a dominant color request, shared by every coalesced waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Color to theme with.
    pub color: HexColor,
    /// How it was obtained.
    pub source: ColorSource,
}

/// Dominant color of `image_ref`, never failing: extraction errors resolve to the fallback accent.
pub async fn dominant_color(state: &SharedState, image_ref: &str) -> HexColor {
    resolve(state, image_ref).await.color
}

/// Cached, coalesced extraction.
///
/// Checks the cache tiers, then joins or starts the single in-flight extraction for the key.
/// Successful results are written to both tiers before the in-flight entry is released. Failures,
/// including a panicking decoder, resolve every waiter with the fallback color and leave the cache
/// untouched so a later call can retry.
pub async fn resolve(state: &SharedState, image_ref: &str) -> Resolution {
    if let Some(color) = state.cache().get(image_ref).await {
        return Resolution {
            color,
            source: ColorSource::Cache,
        };
    }

    let worker_state = Arc::clone(state);
    let key = image_ref.to_owned();
    let settled = state
        .in_flight()
        .get_or_start(image_ref, move || run_extraction(worker_state, key))
        .await;

    settled.unwrap_or_else(|err| {
        let fallback = state.config().fallback_color();
        warn!(
            image_ref,
            error = %err,
            %fallback,
            "dominant color extraction aborted; using fallback"
        );
        Resolution {
            color: fallback,
            source: ColorSource::Fallback,
        }
    })
}

async fn run_extraction(state: SharedState, image_ref: String) -> Resolution {
    // A previous extraction may have settled between the cache miss and joining.
    if let Some(color) = state.cache().local(&image_ref) {
        return Resolution {
            color,
            source: ColorSource::Cache,
        };
    }

    match extract_uncached(&state, &image_ref).await {
        Ok(color) => {
            let color = state.cache().put(&image_ref, color).await;
            debug!(image_ref = %image_ref, %color, "extracted dominant color");
            Resolution {
                color,
                source: ColorSource::Extracted,
            }
        }
        Err(err) => {
            let fallback = state.config().fallback_color();
            warn!(
                image_ref = %image_ref,
                error = %err,
                %fallback,
                "dominant color extraction failed; using fallback"
            );
            Resolution {
                color: fallback,
                source: ColorSource::Fallback,
            }
        }
    }
}

/// Decode, downscale and cluster `image_ref` without touching the cache.
///
/// Both the decode and the clustering run on the blocking pool so the caller's executor thread
/// is never held for the duration of the work.
pub async fn extract_uncached(
    state: &SharedState,
    image_ref: &str,
) -> Result<HexColor, ExtractError> {
    let image = state
        .decoder()
        .decode(image_ref, state.config().target_edge())
        .await?;
    tokio::task::yield_now().await;

    let seed = seed_for(image_ref);
    let owned_ref = image_ref.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut rng = StdRng::seed_from_u64(seed);
        extract_dominant_color(&image, &mut rng).map_err(|err| match err {
            ExtractError::EmptyImage { .. } => ExtractError::EmptyImage {
                image_ref: owned_ref,
            },
            other => other,
        })
    })
    .await
    .map_err(ExtractError::Worker)?
}

/// Stable per-reference seed so the same image clusters the same way every run.
fn seed_for(image_ref: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    image_ref.hash(&mut hasher);
    hasher.finish()
}

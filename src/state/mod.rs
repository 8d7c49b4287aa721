//! Shared process state and the concurrency primitives behind color resolution.

/// Two-tier dominant color cache.
pub mod cache;
/// Per-key request coalescing.
pub mod inflight;

use std::sync::Arc;

use crate::{
    config::AppConfig, dao::color_store::ColorStore, extract::ImageDecoder,
    services::extraction_service::Resolution,
};

pub use self::cache::ColorCache;
pub use self::inflight::InFlight;

/// Cheaply clonable handle to [`ThemeState`].
pub type SharedState = Arc<ThemeState>;

/// Shared process state: configuration, the color cache tiers, in-flight extractions and the
/// injected image decoder.
pub struct ThemeState {
    config: AppConfig,
    cache: ColorCache,
    in_flight: InFlight<Resolution>,
    decoder: Arc<dyn ImageDecoder>,
}

impl ThemeState {
    /// Construct a new [`ThemeState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(
        config: AppConfig,
        decoder: Arc<dyn ImageDecoder>,
        durable: Option<Arc<dyn ColorStore>>,
    ) -> SharedState {
        Arc::new(Self {
            config,
            cache: ColorCache::new(durable),
            in_flight: InFlight::new(),
            decoder,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Two-tier dominant color cache.
    pub fn cache(&self) -> &ColorCache {
        &self.cache
    }

    /// Extractions currently running, keyed by image reference.
    pub fn in_flight(&self) -> &InFlight<Resolution> {
        &self.in_flight
    }

    /// Decoder used to turn image references into pixels.
    pub fn decoder(&self) -> &Arc<dyn ImageDecoder> {
        &self.decoder
    }
}

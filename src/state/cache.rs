use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::{color::HexColor, dao::color_store::ColorStore};

/// Two-tier, append-only color cache keyed by image reference.
///
/// Reads go local first, then to the durable tier (back-filling local on a hit). Writes go
/// local first, then to the durable tier. Durable failures are logged and otherwise ignored.
pub struct ColorCache {
    local: DashMap<String, HexColor>,
    durable: Option<Arc<dyn ColorStore>>,
}

impl ColorCache {
    /// Cache with an optional durable tier.
    pub fn new(durable: Option<Arc<dyn ColorStore>>) -> Self {
        Self {
            local: DashMap::new(),
            durable,
        }
    }

    /// Process-local lookup only.
    pub fn local(&self, image_ref: &str) -> Option<HexColor> {
        self.local.get(image_ref).map(|entry| *entry.value())
    }

    /// Number of entries resolved in this process.
    pub fn local_len(&self) -> usize {
        self.local.len()
    }

    /// Read-through lookup across both tiers.
    pub async fn get(&self, image_ref: &str) -> Option<HexColor> {
        if let Some(color) = self.local(image_ref) {
            debug!(image_ref, %color, "color cache hit (local)");
            return Some(color);
        }

        let durable = self.durable.as_ref()?;
        match durable.load(image_ref).await {
            Ok(Some(color)) => {
                debug!(image_ref, %color, "color cache hit (durable)");
                Some(self.insert_local(image_ref, color))
            }
            Ok(None) => None,
            Err(err) => {
                warn!(image_ref, error = %err, "durable color cache read failed");
                None
            }
        }
    }

    /// Write-through insert. Returns the value now cached, which is the earlier one if the key
    /// had already resolved.
    pub async fn put(&self, image_ref: &str, color: HexColor) -> HexColor {
        let stored = self.insert_local(image_ref, color);
        if let Some(durable) = &self.durable {
            if let Err(err) = durable.save(image_ref, stored).await {
                warn!(image_ref, error = %err, "durable color cache write failed; not persisted");
            }
        }
        stored
    }

    fn insert_local(&self, image_ref: &str, color: HexColor) -> HexColor {
        *self.local.entry(image_ref.to_owned()).or_insert(color).value()
    }
}

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::{self, BoxFuture};

use crate::{
    color::HexColor,
    dao::{color_store::ColorStore, storage::StorageResult},
};

/// In-process stand-in for a durable store; contents vanish with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryColorStore {
    entries: Arc<DashMap<String, HexColor>>,
}

impl MemoryColorStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been persisted yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ColorStore for MemoryColorStore {
    fn load(&self, image_ref: &str) -> BoxFuture<'static, StorageResult<Option<HexColor>>> {
        let found = self.entries.get(image_ref).map(|entry| *entry.value());
        Box::pin(future::ready(Ok(found)))
    }

    fn save(&self, image_ref: &str, color: HexColor) -> BoxFuture<'static, StorageResult<()>> {
        self.entries.entry(image_ref.to_owned()).or_insert(color);
        Box::pin(future::ready(Ok(())))
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::ready(Ok(())))
    }
}

/// CouchDB-backed store.
#[cfg(feature = "couch-store")]
pub mod couchdb;
mod file;
mod memory;

use futures::future::BoxFuture;

use crate::{color::HexColor, dao::storage::StorageResult};

pub use self::file::JsonFileColorStore;
pub use self::memory::MemoryColorStore;

/// Abstraction over the durable tier of the color cache, keyed by image reference.
///
/// Entries are append-only: saving a key that already resolved keeps the first value.
pub trait ColorStore: Send + Sync {
    /// Color previously stored for `image_ref`, if any.
    fn load(&self, image_ref: &str) -> BoxFuture<'static, StorageResult<Option<HexColor>>>;
    /// Persist `color` unless `image_ref` already has one.
    fn save(&self, image_ref: &str, color: HexColor) -> BoxFuture<'static, StorageResult<()>>;
    /// Verify the backend is reachable and readable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

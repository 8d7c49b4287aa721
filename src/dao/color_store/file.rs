use std::{collections::BTreeMap, io::ErrorKind, path::PathBuf, sync::Arc};

use futures::future::BoxFuture;
use tokio::{fs, sync::Mutex};
use tracing::debug;

use crate::{
    color::HexColor,
    dao::{
        color_store::ColorStore,
        storage::{StorageError, StorageResult},
    },
};

type Entries = BTreeMap<String, HexColor>;

/// Durable store persisting every resolved color into a single JSON object on disk.
///
/// The file is read lazily on first access and rewritten through a temporary file so a crash
/// mid-write never leaves a truncated cache behind.
#[derive(Clone)]
pub struct JsonFileColorStore {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    entries: Mutex<Option<Entries>>,
}

impl JsonFileColorStore {
    /// Store backed by `path`; the file and its parent directories are created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                path: path.into(),
                entries: Mutex::new(None),
            }),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &PathBuf {
        &self.inner.path
    }
}

impl Inner {
    async fn read_entries(&self) -> StorageResult<Entries> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| {
                StorageError::cache_io(
                    format!("corrupt color cache `{}`", self.path.display()),
                    source,
                )
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(err) => Err(StorageError::cache_io(
                format!("failed to read `{}`", self.path.display()),
                err,
            )),
        }
    }

    async fn write_entries(&self, entries: &Entries) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|source| {
                StorageError::cache_io(format!("failed to create `{}`", parent.display()), source)
            })?;
        }

        let payload = serde_json::to_vec_pretty(entries).map_err(|source| {
            StorageError::cache_io("failed to serialize color cache", source)
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload).await.map_err(|source| {
            StorageError::cache_io(format!("failed to write `{}`", tmp.display()), source)
        })?;
        fs::rename(&tmp, &self.path).await.map_err(|source| {
            StorageError::cache_io(
                format!("failed to replace `{}`", self.path.display()),
                source,
            )
        })
    }
}

impl ColorStore for JsonFileColorStore {
    fn load(&self, image_ref: &str) -> BoxFuture<'static, StorageResult<Option<HexColor>>> {
        let inner = Arc::clone(&self.inner);
        let key = image_ref.to_owned();
        Box::pin(async move {
            let mut guard = inner.entries.lock().await;
            if guard.is_none() {
                *guard = Some(inner.read_entries().await?);
            }
            Ok(guard.as_ref().and_then(|entries| entries.get(&key).copied()))
        })
    }

    fn save(&self, image_ref: &str, color: HexColor) -> BoxFuture<'static, StorageResult<()>> {
        let inner = Arc::clone(&self.inner);
        let key = image_ref.to_owned();
        Box::pin(async move {
            let mut guard = inner.entries.lock().await;
            let mut entries = match guard.take() {
                Some(entries) => entries,
                None => inner.read_entries().await?,
            };

            if entries.contains_key(&key) {
                *guard = Some(entries);
                return Ok(());
            }

            entries.insert(key.clone(), color);
            let written = inner.write_entries(&entries).await;
            if written.is_err() {
                entries.remove(&key);
            } else {
                debug!(image_ref = %key, %color, "persisted dominant color");
            }
            *guard = Some(entries);
            written
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move { inner.read_entries().await.map(|_| ()) })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!(
                "gift-theme-{}-{}",
                std::process::id(),
                COUNTER.fetch_add(1, Ordering::Relaxed)
            ))
            .join(name)
    }

    #[tokio::test]
    async fn persists_across_instances() {
        let path = scratch_path("colors.json");
        let red = HexColor::from_rgb(255, 0, 0);

        let store = JsonFileColorStore::new(&path);
        assert_eq!(store.load("card.png").await.unwrap(), None);
        store.save("card.png", red).await.unwrap();

        let reopened = JsonFileColorStore::new(&path);
        assert_eq!(reopened.load("card.png").await.unwrap(), Some(red));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"#ff0000\""));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn keeps_first_value() {
        let path = scratch_path("colors.json");
        let store = JsonFileColorStore::new(&path);
        let red = HexColor::from_rgb(255, 0, 0);
        store.save("card.png", red).await.unwrap();
        store.save("card.png", HexColor::BLACK).await.unwrap();
        assert_eq!(store.load("card.png").await.unwrap(), Some(red));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_cache_io_error() {
        let path = scratch_path("colors.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileColorStore::new(&path);
        let err = store.load("card.png").await.unwrap_err();
        assert!(matches!(err, StorageError::CacheIo { .. }));
        assert!(store.health_check().await.is_err());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}

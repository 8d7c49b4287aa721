use std::error::Error;
use thiserror::Error;

/// Result alias for durable cache operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by durable cache backends regardless of where they persist.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the durable tier failed.
    #[error("color cache I/O failed: {message}")]
    CacheIo {
        /// What was being attempted.
        message: String,
        /// Underlying backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct a cache I/O error from any backend failure.
    pub fn cache_io(message: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::CacheIo {
            message: message.into(),
            source: Box::new(source),
        }
    }
}

//! Persistence layer for resolved colors.

/// Durable color cache backends.
pub mod color_store;
/// Storage abstraction layer for cache I/O errors.
pub mod storage;

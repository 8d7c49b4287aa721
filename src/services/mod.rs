//! Orchestration over the shared state.

/// Cached, coalesced dominant color extraction.
pub mod extraction_service;
/// Palette and animation parameters derived from an image.
pub mod theme_service;

//! Library crate for gift-theme: image-derived color theming and the animation parameters built
//! from it, exposed for the binary and tests.

pub mod animation;
pub mod color;
pub mod config;
pub mod dao;
pub mod error;
pub mod extract;
pub mod services;
pub mod state;
pub mod theme;

//! Platform layer
//!
//! Implementations of the surface and fetch contracts:
//! - `headless`: recording surface and in-memory fetcher for native runs and tests
//! - `web` (wasm32): Canvas 2D surface, image fetcher, keyboard and animation frame wiring

pub mod headless;

#[cfg(target_arch = "wasm32")]
pub mod web;

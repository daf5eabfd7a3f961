//! Offline asset caching module.
//!
//! This module provides the `AssetStore`, a versioned on-disk bucket of
//! captured static assets. It follows a cache-first strategy for static
//! content and a network-only passthrough for the live station API.
//! Failures here degrade the app to always-network behavior; they never
//! block startup.

pub mod assets;

pub use assets::{Asset, AssetSource, AssetStore, CacheError};

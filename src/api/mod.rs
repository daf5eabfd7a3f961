//! REST API client module for the CityBikes network feed.
//!
//! This module provides the `StationClient` for fetching the live
//! station list, including per-station occupancy counts. The feed is
//! public and read-only; no authentication is involved.

pub mod client;
pub mod error;

pub use client::StationClient;
pub use error::ApiError;

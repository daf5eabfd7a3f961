//! Location acquisition for the discovery cycle.
//!
//! The orchestrator asks a `LocationProvider` for the user's current
//! position exactly once per cycle. The default provider resolves the
//! position over an IP-geolocation endpoint; tests and the configured
//! coordinate override bypass it entirely.

pub mod error;
pub mod provider;

pub use error::LocationError;
pub use provider::{GeoIpProvider, LocationProvider};

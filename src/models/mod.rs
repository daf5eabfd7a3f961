//! Data models for bike-share network data.
//!
//! This module contains the structures used to represent the CityBikes
//! API response and the derived per-query types:
//!
//! - `Station`, `NetworkResponse`: wire format of the network feed
//! - `AnnotatedStation`: a station with its computed distance
//! - `Availability`: service state derived from occupancy counts

pub mod station;

pub use station::{AnnotatedStation, Availability, Network, NetworkResponse, Station};

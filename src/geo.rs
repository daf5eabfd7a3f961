//! Geographic primitives: coordinates, distances, and proximity selection.
//!
//! Distances are great-circle kilometers via the haversine formula
//! (spherical Earth, radius 6371 km). Inputs are assumed to be valid
//! decimal degrees; validation is the caller's responsibility.

use serde::{Deserialize, Serialize};

use crate::models::{AnnotatedStation, Station};

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Format as "Lat x.xxxx, Lon y.yyyy" for the coordinate display.
    pub fn display(&self) -> String {
        format!("Lat {:.4}, Lon {:.4}", self.latitude, self.longitude)
    }
}

/// Great-circle distance between two coordinates in kilometers.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    haversine::distance(
        haversine::Location {
            latitude: a.latitude,
            longitude: a.longitude,
        },
        haversine::Location {
            latitude: b.latitude,
            longitude: b.longitude,
        },
        haversine::Units::Kilometers,
    )
}

/// Annotate every station with its distance from `origin`, keep those
/// within `radius_km` (inclusive), and sort ascending by distance.
///
/// The sort is stable: stations at equal distance keep their API order.
/// An empty result means nothing qualified, not a failure.
pub fn select_nearby(
    stations: Vec<Station>,
    origin: Coordinate,
    radius_km: f64,
) -> Vec<AnnotatedStation> {
    let mut nearby: Vec<AnnotatedStation> = stations
        .into_iter()
        .map(|station| {
            let distance = distance_km(origin, station.coordinate());
            AnnotatedStation {
                station,
                distance_km: distance,
            }
        })
        .filter(|annotated| annotated.distance_km <= radius_km)
        .collect();

    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}

// ============================================================================
// Tests
// ============================================================================

//! Data models for the CityBikes network API.
//!
//! These types mirror the `/v2/networks/{id}` response body. Fields we do
//! not use are ignored during deserialization, and occupancy counts that
//! some networks omit default to zero rather than failing the parse.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Top-level response wrapper: `{ "network": { "stations": [...] } }`.
///
/// A missing `network` object or `stations` list decodes as empty. The
/// upstream feed omits the list for networks with no live data, and an
/// empty result is the correct reading, not a malformed response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkResponse {
    #[serde(default)]
    pub network: Network,
}

/// The network body; only the station list matters to us.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Network {
    #[serde(default)]
    pub stations: Vec<Station>,
}

/// A single bike-share dock location as reported by the network API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub free_bikes: u32,
    #[serde(default)]
    pub empty_slots: u32,
}

impl Station {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn availability(&self) -> Availability {
        Availability::of(self.free_bikes, self.empty_slots)
    }
}

/// A station annotated with its distance from the query origin.
/// Derived per discovery cycle and never cached.
#[derive(Debug, Clone)]
pub struct AnnotatedStation {
    pub station: Station,
    pub distance_km: f64,
}

/// Service state of a station, derived from its occupancy counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Bikes to rent and docks to return to
    FullService,
    /// Bikes to rent but nowhere to return one
    BikesOnly,
    /// Docks to return to but nothing to rent
    DocksOnly,
    /// Neither bikes nor docks
    OutOfService,
}

impl Availability {
    pub fn of(free_bikes: u32, empty_slots: u32) -> Self {
        match (free_bikes > 0, empty_slots > 0) {
            (true, true) => Availability::FullService,
            (true, false) => Availability::BikesOnly,
            (false, true) => Availability::DocksOnly,
            (false, false) => Availability::OutOfService,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_priority() {
        assert_eq!(Availability::of(5, 3), Availability::FullService);
        assert_eq!(Availability::of(5, 0), Availability::BikesOnly);
        assert_eq!(Availability::of(0, 3), Availability::DocksOnly);
        assert_eq!(Availability::of(0, 0), Availability::OutOfService);
    }

    #[test]
    fn test_parse_network_response() {
        let body = r#"{
            "network": {
                "id": "bikesampa",
                "stations": [
                    {
                        "id": "abc123",
                        "name": "Estação Paulista",
                        "latitude": -23.5613,
                        "longitude": -46.6561,
                        "free_bikes": 5,
                        "empty_slots": 3,
                        "timestamp": "2024-01-01T00:00:00Z"
                    }
                ]
            }
        }"#;

        let parsed: NetworkResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.network.stations.len(), 1);

        let station = &parsed.network.stations[0];
        assert_eq!(station.name, "Estação Paulista");
        assert_eq!(station.free_bikes, 5);
        assert_eq!(station.empty_slots, 3);
    }

    #[test]
    fn test_parse_missing_stations_list_is_empty() {
        let parsed: NetworkResponse =
            serde_json::from_str(r#"{ "network": { "id": "bikesampa" } }"#).unwrap();
        assert!(parsed.network.stations.is_empty());

        let parsed: NetworkResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(parsed.network.stations.is_empty());
    }

    #[test]
    fn test_parse_missing_occupancy_defaults_to_zero() {
        let body = r#"{
            "network": {
                "stations": [
                    { "name": "Bare", "latitude": 0.0, "longitude": 0.0 }
                ]
            }
        }"#;

        let parsed: NetworkResponse = serde_json::from_str(body).unwrap();
        let station = &parsed.network.stations[0];
        assert_eq!(station.free_bikes, 0);
        assert_eq!(station.empty_slots, 0);
        assert_eq!(station.availability(), Availability::OutOfService);
    }
}

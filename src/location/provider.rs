//! Position providers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::geo::Coordinate;

use super::LocationError;

/// Timeout for a single position query in seconds.
/// The station fetch carries no timeout; only this step does.
const POSITION_TIMEOUT_SECS: u64 = 10;

/// One-shot source of the user's current position.
///
/// Implementations must query live on every call; a previously obtained
/// position is never reused across discovery cycles.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinate, LocationError>;
}

/// Response body of the IP-geolocation endpoint.
#[derive(Debug, Deserialize)]
struct GeoIpResponse {
    #[serde(default)]
    status: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Resolves the current position from an IP-geolocation endpoint.
pub struct GeoIpProvider {
    client: Client,
    endpoint: String,
}

impl GeoIpProvider {
    /// Create a provider for the given endpoint. Returns `Unsupported`
    /// when no endpoint is configured, mirroring a device without any
    /// location capability.
    pub fn new(endpoint: &str) -> Result<Self, LocationError> {
        if endpoint.trim().is_empty() {
            return Err(LocationError::Unsupported);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(POSITION_TIMEOUT_SECS))
            .build()
            .map_err(|_| LocationError::Unsupported)?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    fn classify_transport(err: reqwest::Error) -> LocationError {
        if err.is_timeout() {
            LocationError::Timeout
        } else if err.is_connect() {
            LocationError::PositionUnavailable
        } else {
            LocationError::Unknown
        }
    }
}

#[async_trait]
impl LocationProvider for GeoIpProvider {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        debug!(endpoint = %self.endpoint, "Requesting current position");

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(Self::classify_transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(LocationError::PermissionDenied);
        }
        if !status.is_success() {
            return Err(LocationError::PositionUnavailable);
        }

        let body: GeoIpResponse = response
            .json()
            .await
            .map_err(|_| LocationError::Unknown)?;

        position_from_response(body)
    }
}

/// Extract a coordinate from the provider response, treating an explicit
/// "fail" status or missing fields as an unavailable position.
fn position_from_response(body: GeoIpResponse) -> Result<Coordinate, LocationError> {
    if matches!(body.status.as_deref(), Some("fail")) {
        return Err(LocationError::PositionUnavailable);
    }

    match (body.lat, body.lon) {
        (Some(latitude), Some(longitude)) => Ok(Coordinate::new(latitude, longitude)),
        _ => Err(LocationError::PositionUnavailable),
    }
}

// ============================================================================
// Tests
// ============================================================================

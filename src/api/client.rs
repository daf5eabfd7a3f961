//! API client for the CityBikes station network feed.
//!
//! One network, one endpoint, one GET per discovery cycle. The client
//! never retries; a failed request surfaces as a status message and the
//! user triggers again.

use reqwest::Client;
use tracing::debug;

use crate::models::{NetworkResponse, Station};

use super::ApiError;

/// Client for the station network API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct StationClient {
    client: Client,
    endpoint: String,
}

impl StationClient {
    /// Create a client for the given network endpoint, sharing an existing
    /// connection pool.
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Fetch the full station list for the configured network.
    ///
    /// An absent `stations` list in the body decodes as an empty list;
    /// only unparseable JSON is treated as a malformed response.
    pub async fn fetch_stations(&self) -> Result<Vec<Station>, ApiError> {
        debug!(endpoint = %self.endpoint, "Fetching station network");

        let response = self.client.get(&self.endpoint).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let body = response.text().await?;
        let parsed: NetworkResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::Malformed(e.to_string()))?;

        debug!(
            stations = parsed.network.stations.len(),
            "Station network fetched"
        );
        Ok(parsed.network.stations)
    }
}

//! Application state management for nearbike.
//!
//! This module contains the `App` struct holding all UI-visible state and
//! the discovery orchestrator: a state machine driven by a background
//! tokio task that acquires a position, fetches the station network, and
//! hands the selected stations back over an mpsc channel.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::StationClient;
use crate::cache::AssetStore;
use crate::config::AppConfig;
use crate::geo::{self, Coordinate};
use crate::location::{GeoIpProvider, LocationError, LocationProvider};
use crate::models::AnnotatedStation;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A discovery cycle emits at most three events; 32 leaves headroom for
/// the cache task.
const CHANNEL_BUFFER_SIZE: usize = 32;

// ============================================================================
// Discovery State Machine
// ============================================================================

/// Phases of one discovery cycle.
///
/// The trigger is ignored while a cycle is in flight; `Error` re-enables
/// it. Within a cycle the phases always advance in order, never in
/// parallel: location resolution precedes the network fetch, which
/// precedes rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryPhase {
    Idle,
    RequestingLocation,
    FetchingNetwork,
    Rendering,
    Error,
}

/// Styling class of the current status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// The single status line shown under the title bar.
#[derive(Debug, Clone)]
pub struct StatusLine {
    pub text: String,
    pub kind: StatusKind,
}

impl StatusLine {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Info,
        }
    }

    fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Success,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }
}

// ============================================================================
// Background Task Events
// ============================================================================

/// Events sent from background tasks back to the main loop.
#[derive(Debug)]
enum AppEvent {
    /// A position was obtained; the network fetch is starting
    PositionAcquired(Coordinate),
    /// The cycle completed; stations are annotated, filtered, and sorted
    StationsSelected(Vec<AnnotatedStation>),
    /// The cycle failed; the message is ready for the status region
    DiscoveryFailed(String),
    /// The offline asset bucket was installed and activated
    OfflineAssetsReady { stored: usize },
    /// The offline layer failed; the app degrades to always-network
    OfflineAssetsFailed(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    pub config: AppConfig,

    // Discovery state
    pub phase: DiscoveryPhase,
    pub status: StatusLine,
    pub position: Option<Coordinate>,
    pub results: Vec<AnnotatedStation>,
    /// True once a cycle has completed; gates the empty-state notice.
    pub has_searched: bool,

    // Core services
    stations_api: StationClient,
    locator: Option<Arc<dyn LocationProvider>>,
    assets: Option<Arc<AssetStore>>,
    http: reqwest::Client,

    // Background task channel
    events_rx: mpsc::Receiver<AppEvent>,
    events_tx: mpsc::Sender<AppEvent>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: AppConfig) -> Result<Self> {
        // The station fetch deliberately carries no timeout; only the
        // location step does (inside GeoIpProvider).
        let http = reqwest::Client::builder().build()?;
        let stations_api = StationClient::new(http.clone(), config.network_endpoint.clone());

        let locator: Option<Arc<dyn LocationProvider>> =
            match GeoIpProvider::new(&config.locator_endpoint) {
                Ok(provider) => Some(Arc::new(provider)),
                Err(e) => {
                    warn!(error = %e, "Location lookup unavailable");
                    None
                }
            };

        let assets = match config
            .buckets_dir()
            .and_then(|dir| {
                AssetStore::open(dir, &config.cache_version, &config.api_origin)
                    .map_err(Into::into)
            }) {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                warn!(error = %e, "Offline asset cache unavailable");
                None
            }
        };

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            config,
            phase: DiscoveryPhase::Idle,
            status: StatusLine::info("Press [f] to find nearby stations."),
            position: None,
            results: Vec::new(),
            has_searched: false,
            stations_api,
            locator,
            assets,
            http,
            events_rx: rx,
            events_tx: tx,
        })
    }

    /// Whether a discovery cycle is currently in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            DiscoveryPhase::RequestingLocation
                | DiscoveryPhase::FetchingNetwork
                | DiscoveryPhase::Rendering
        )
    }

    /// Label for the trigger control in the footer.
    pub fn trigger_label(&self) -> &'static str {
        if self.is_busy() {
            "Searching..."
        } else {
            "Find stations"
        }
    }

    // =========================================================================
    // Discovery cycle
    // =========================================================================

    /// Start a discovery cycle. A repeat trigger while one is in flight
    /// is ignored, so cycles never overlap.
    pub fn start_discovery(&mut self) {
        if self.is_busy() {
            debug!("Trigger ignored: discovery already in flight");
            return;
        }

        info!("Starting discovery cycle");
        self.phase = DiscoveryPhase::RequestingLocation;
        self.results.clear();
        self.has_searched = false;
        self.position = None;
        self.status = if self.config.override_position.is_some() {
            StatusLine::info("1. Override active! Using configured coordinates...")
        } else {
            StatusLine::info("1. Requesting your location...")
        };

        let tx = self.events_tx.clone();
        let override_position = self.config.override_position;
        let locator = self.locator.clone();
        let api = self.stations_api.clone();
        let radius_km = self.config.radius_km;

        tokio::spawn(async move {
            run_discovery(override_position, locator, api, radius_km, tx).await;
        });
    }

    /// Kick off the offline asset lifecycle: install the current bucket,
    /// then purge stale ones. Runs once at startup; failures degrade the
    /// app to always-network behavior.
    pub fn start_asset_install(&self) {
        let Some(assets) = self.assets.clone() else {
            // Opening the bucket already failed; surface the one-time notice.
            let _ = self
                .events_tx
                .try_send(AppEvent::OfflineAssetsFailed(
                    "Offline assets unavailable; running network-only.".to_string(),
                ));
            return;
        };

        let tx = self.events_tx.clone();
        let client = self.http.clone();
        let manifest = self.config.asset_manifest.clone();

        tokio::spawn(async move {
            let outcome = match assets.install(&client, &manifest).await {
                Ok(stored) => assets.activate().map(|()| stored),
                Err(e) => Err(e),
            };
            let event = match outcome {
                Ok(stored) => AppEvent::OfflineAssetsReady { stored },
                Err(e) => AppEvent::OfflineAssetsFailed(format!(
                    "Offline assets unavailable: {e}"
                )),
            };
            let _ = tx.send(event).await;
        });
    }

    /// Drain completed background work. Called every pass of the main loop.
    pub fn check_background_tasks(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
        }
    }

    /// Finish the Rendering phase after the frame has been drawn:
    /// emit the success status and return to Idle.
    pub fn complete_render(&mut self) {
        if self.phase != DiscoveryPhase::Rendering {
            return;
        }
        self.status = StatusLine::success(format!(
            "3. Success! Found {} stations within {} km.",
            self.results.len(),
            self.config.radius_km
        ));
        self.phase = DiscoveryPhase::Idle;
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::PositionAcquired(position) => {
                self.position = Some(position);
                self.phase = DiscoveryPhase::FetchingNetwork;
                self.status = StatusLine::info(
                    "2. Coordinates acquired! Fetching the station network...",
                );
            }
            AppEvent::StationsSelected(stations) => {
                info!(count = stations.len(), "Discovery cycle complete");
                self.results = stations;
                self.has_searched = true;
                self.phase = DiscoveryPhase::Rendering;
            }
            AppEvent::DiscoveryFailed(message) => {
                warn!(%message, "Discovery cycle failed");
                self.results.clear();
                self.phase = DiscoveryPhase::Error;
                self.status = StatusLine::error(message);
            }
            AppEvent::OfflineAssetsReady { stored } => {
                info!(stored, "Offline assets ready");
                if !self.is_busy() && self.phase != DiscoveryPhase::Error {
                    self.status = StatusLine::info(
                        "Offline assets ready. Press [f] to find nearby stations.",
                    );
                }
            }
            AppEvent::OfflineAssetsFailed(message) => {
                warn!(%message, "Offline asset layer failed");
                if !self.is_busy() {
                    self.status = StatusLine::error(message);
                }
            }
        }
    }
}

// ============================================================================
// The discovery task
// ============================================================================

/// One discovery cycle: resolve a position, fetch the network, select
/// nearby stations. Exactly one position query and one network GET per
/// call, in that order, with no retries. A location failure short-circuits
/// before any network fetch.
async fn run_discovery(
    override_position: Option<Coordinate>,
    locator: Option<Arc<dyn LocationProvider>>,
    api: StationClient,
    radius_km: f64,
    tx: mpsc::Sender<AppEvent>,
) {
    let position = match override_position {
        Some(position) => position,
        None => {
            let Some(locator) = locator else {
                let _ = tx
                    .send(AppEvent::DiscoveryFailed(format!(
                        "Location error: {}",
                        LocationError::Unsupported
                    )))
                    .await;
                return;
            };
            match locator.current_position().await {
                Ok(position) => position,
                Err(e) => {
                    let _ = tx
                        .send(AppEvent::DiscoveryFailed(format!("Location error: {e}")))
                        .await;
                    return;
                }
            }
        }
    };

    let _ = tx.send(AppEvent::PositionAcquired(position)).await;

    let stations = match api.fetch_stations().await {
        Ok(stations) => stations,
        Err(e) => {
            let _ = tx
                .send(AppEvent::DiscoveryFailed(format!(
                    "Station lookup failed: {e}"
                )))
                .await;
            return;
        }
    };

    let nearby = geo::select_nearby(stations, position, radius_km);
    let _ = tx.send(AppEvent::StationsSelected(nearby)).await;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::models::Station;

    fn test_app() -> App {
        let mut config = AppConfig::default();
        // Keep tests off the network and off the real filesystem caches
        config.locator_endpoint = String::new();
        config.asset_manifest = Vec::new();
        App::new(config).unwrap()
    }

    fn annotated(name: &str, distance_km: f64) -> AnnotatedStation {
        AnnotatedStation {
            station: Station {
                id: None,
                name: name.to_string(),
                latitude: 0.0,
                longitude: 0.0,
                free_bikes: 1,
                empty_slots: 1,
            },
            distance_km,
        }
    }

    struct DenyAll;

    #[async_trait]
    impl LocationProvider for DenyAll {
        async fn current_position(&self) -> Result<Coordinate, LocationError> {
            Err(LocationError::PermissionDenied)
        }
    }

    #[tokio::test]
    async fn test_trigger_enters_requesting_location_and_clears_results() {
        let mut app = test_app();
        app.results = vec![annotated("Leftover", 1.0)];

        app.start_discovery();

        assert_eq!(app.phase, DiscoveryPhase::RequestingLocation);
        assert!(app.results.is_empty());
        assert!(app.position.is_none());
        assert!(app.is_busy());
    }

    #[tokio::test]
    async fn test_repeat_trigger_is_ignored_while_busy() {
        let mut app = test_app();
        app.start_discovery();
        let status_before = app.status.text.clone();

        app.start_discovery();

        assert_eq!(app.phase, DiscoveryPhase::RequestingLocation);
        assert_eq!(app.status.text, status_before);
    }

    #[tokio::test]
    async fn test_position_acquired_advances_to_fetching() {
        let mut app = test_app();
        app.start_discovery();

        app.apply_event(AppEvent::PositionAcquired(Coordinate::new(
            -23.5613, -46.6561,
        )));

        assert_eq!(app.phase, DiscoveryPhase::FetchingNetwork);
        assert!(app.position.is_some());
    }

    #[tokio::test]
    async fn test_success_reports_count_and_radius_then_idles() {
        let mut app = test_app();
        app.start_discovery();
        app.apply_event(AppEvent::PositionAcquired(Coordinate::new(0.0, 0.0)));
        app.apply_event(AppEvent::StationsSelected(vec![
            annotated("A", 0.5),
            annotated("B", 1.5),
        ]));

        assert_eq!(app.phase, DiscoveryPhase::Rendering);

        app.complete_render();

        assert_eq!(app.phase, DiscoveryPhase::Idle);
        assert_eq!(app.status.kind, StatusKind::Success);
        assert!(app.status.text.contains("2 stations"));
        assert!(app.status.text.contains("5 km"));
        assert!(!app.is_busy());
    }

    #[tokio::test]
    async fn test_failure_clears_results_and_reenables_trigger() {
        let mut app = test_app();
        app.start_discovery();
        app.apply_event(AppEvent::PositionAcquired(Coordinate::new(0.0, 0.0)));
        app.results = vec![annotated("Stale", 1.0)];

        app.apply_event(AppEvent::DiscoveryFailed(
            "Station lookup failed: API error 503: Service Unavailable".to_string(),
        ));

        assert_eq!(app.phase, DiscoveryPhase::Error);
        assert_eq!(app.status.kind, StatusKind::Error);
        assert!(app.status.text.contains("503"));
        assert!(app.results.is_empty());
        // The trigger works again from the error state
        app.start_discovery();
        assert_eq!(app.phase, DiscoveryPhase::RequestingLocation);
    }

    #[tokio::test]
    async fn test_permission_denied_skips_network_fetch() {
        // An endpoint that would fail loudly if contacted; the cycle must
        // end after the location failure without touching it.
        let client = reqwest::Client::new();
        let api = StationClient::new(client, "http://127.0.0.1:1/v2/networks/x");
        let (tx, mut rx) = mpsc::channel(8);

        run_discovery(None, Some(Arc::new(DenyAll)), api, 5.0, tx).await;

        let first = rx.recv().await.unwrap();
        match first {
            AppEvent::DiscoveryFailed(message) => {
                assert!(message.contains("Permission denied"));
            }
            other => panic!("expected DiscoveryFailed, got {other:?}"),
        }
        assert!(rx.recv().await.is_none(), "no further events after a location failure");
    }

    #[tokio::test]
    async fn test_override_position_skips_the_locator() {
        // No locator at all: the override must carry the cycle into the
        // fetch step on its own.
        let client = reqwest::Client::new();
        let api = StationClient::new(client, "http://127.0.0.1:1/v2/networks/x");
        let (tx, mut rx) = mpsc::channel(8);

        let paulista = Coordinate::new(-23.5613, -46.6561);
        run_discovery(Some(paulista), None, api, 5.0, tx).await;

        match rx.recv().await.unwrap() {
            AppEvent::PositionAcquired(position) => {
                assert_eq!(position.latitude, -23.5613);
            }
            other => panic!("expected PositionAcquired, got {other:?}"),
        }
        // The dead endpoint then fails the fetch step
        match rx.recv().await.unwrap() {
            AppEvent::DiscoveryFailed(message) => {
                assert!(message.starts_with("Station lookup failed"));
            }
            other => panic!("expected DiscoveryFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unsupported_locator_fails_without_any_request() {
        let client = reqwest::Client::new();
        let api = StationClient::new(client, "http://127.0.0.1:1/v2/networks/x");
        let (tx, mut rx) = mpsc::channel(8);

        run_discovery(None, None, api, 5.0, tx).await;

        match rx.recv().await.unwrap() {
            AppEvent::DiscoveryFailed(message) => {
                assert!(message.contains("not supported"));
            }
            other => panic!("expected DiscoveryFailed, got {other:?}"),
        }
    }
}

//! Application configuration.
//!
//! All knobs live in one immutable `AppConfig` handed to the orchestrator
//! at construction: endpoints, search radius, the optional coordinate
//! override, and the offline cache version and manifest. Defaults are
//! compiled in; a JSON file at `~/.config/nearbike/config.json` overlays
//! them field by field.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "nearbike";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// CityBikes endpoint for the Bike Sampa network (São Paulo).
const DEFAULT_NETWORK_ENDPOINT: &str = "https://api.citybik.es/v2/networks/bikesampa";

/// Origin prefix of the dynamic station API; requests here bypass the
/// asset cache so occupancy data is always live.
const DEFAULT_API_ORIGIN: &str = "https://api.citybik.es/";

/// IP-geolocation endpoint used by the default location provider.
const DEFAULT_LOCATOR_ENDPOINT: &str = "http://ip-api.com/json";

/// Stations beyond this distance are not shown.
const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Name of the active asset cache bucket. Bump the suffix to invalidate
/// previously installed buckets on next activate.
const DEFAULT_CACHE_VERSION: &str = "nearbike-assets-v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Station network endpoint queried once per discovery cycle.
    pub network_endpoint: String,
    /// Origin prefix identifying dynamic API requests.
    pub api_origin: String,
    /// Search radius in kilometers (inclusive).
    pub radius_km: f64,
    /// When set, skips the location provider and uses this coordinate.
    /// Handy for demos, e.g. {"latitude": -23.5613, "longitude": -46.6561}
    /// puts you on Av. Paulista.
    pub override_position: Option<Coordinate>,
    /// IP-geolocation endpoint; empty disables location lookup entirely.
    pub locator_endpoint: String,
    /// Versioned name of the active asset bucket.
    pub cache_version: String,
    /// Static asset URLs captured at install time: the companion web
    /// shell plus pinned third-party stylesheet/font URLs.
    pub asset_manifest: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network_endpoint: DEFAULT_NETWORK_ENDPOINT.to_string(),
            api_origin: DEFAULT_API_ORIGIN.to_string(),
            radius_km: DEFAULT_RADIUS_KM,
            override_position: None,
            locator_endpoint: DEFAULT_LOCATOR_ENDPOINT.to_string(),
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            asset_manifest: vec![
                "https://dlaporte.github.io/nearbike/index.html".to_string(),
                "https://dlaporte.github.io/nearbike/app.js".to_string(),
                "https://dlaporte.github.io/nearbike/style.css".to_string(),
                "https://dlaporte.github.io/nearbike/manifest.json".to_string(),
                "https://cdn.tailwindcss.com".to_string(),
                "https://fonts.googleapis.com/css2?family=Inter:wght@400;600;700&display=swap"
                    .to_string(),
            ],
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the versioned asset buckets.
    pub fn buckets_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join("buckets"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.radius_km, 5.0);
        assert!(config.network_endpoint.starts_with(config.api_origin.as_str()));
        assert!(config.override_position.is_none());
        assert!(!config.asset_manifest.is_empty());
    }

    #[test]
    fn test_partial_config_overlays_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "radius_km": 2.5, "override_position": { "latitude": -23.5613, "longitude": -46.6561 } }"#,
        )
        .unwrap();

        assert_eq!(config.radius_km, 2.5);
        let position = config.override_position.unwrap();
        assert_eq!(position.latitude, -23.5613);
        // Untouched fields keep their defaults
        assert_eq!(config.cache_version, "nearbike-assets-v1");
    }
}

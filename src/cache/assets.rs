// Allow dead code: fetch interception is the cache's public entry point;
// the TUI only needs install/activate at startup
#![allow(dead_code)]

//! Versioned offline store for the app's static assets.
//!
//! Assets live in a named bucket directory keyed by the cache version.
//! Installing a version populates its bucket from the asset manifest;
//! activating it deletes every other bucket, so exactly one version is
//! live at a time. All asset traffic goes through [`AssetStore::fetch`],
//! which serves static content cache-first and always hits the network
//! for the dynamic station API so occupancy data stays live.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Maximum concurrent manifest downloads during install.
const MAX_CONCURRENT_INSTALLS: usize = 4;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to open cache bucket: {0}")]
    Open(#[source] std::io::Error),

    #[error("Failed to populate cache bucket: {0}")]
    Populate(String),
}

/// Sidecar metadata stored next to each captured body.
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    url: String,
    content_type: Option<String>,
    stored_at: DateTime<Utc>,
}

/// Where a fetched asset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSource {
    Cache,
    Network,
}

/// A response body captured from the cache or the network.
#[derive(Debug)]
pub struct Asset {
    pub url: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub source: AssetSource,
}

/// Cache of static assets, bucketed by version under the platform cache
/// directory.
pub struct AssetStore {
    buckets_dir: PathBuf,
    version: String,
    api_origin: String,
}

impl AssetStore {
    /// Open (creating if needed) the bucket for `version`.
    ///
    /// Requests whose URL starts with `api_origin` bypass the cache.
    pub fn open(
        buckets_dir: PathBuf,
        version: &str,
        api_origin: &str,
    ) -> Result<Self, CacheError> {
        let store = Self {
            buckets_dir,
            version: version.to_string(),
            api_origin: api_origin.to_string(),
        };
        std::fs::create_dir_all(store.bucket_dir()).map_err(CacheError::Open)?;
        Ok(store)
    }

    fn bucket_dir(&self) -> PathBuf {
        self.buckets_dir.join(&self.version)
    }

    fn entry_paths(&self, url: &str) -> (PathBuf, PathBuf) {
        let key = urlencoding::encode(url).into_owned();
        let bucket = self.bucket_dir();
        (
            bucket.join(format!("{}.body", key)),
            bucket.join(format!("{}.json", key)),
        )
    }

    /// True when the URL targets the dynamic station API and must never
    /// be served from the bucket.
    pub fn is_dynamic(&self, url: &str) -> bool {
        url.starts_with(&self.api_origin)
    }

    /// Populate the bucket from the asset manifest.
    ///
    /// Downloads run concurrently; individual failures are logged and
    /// skipped so one unreachable asset does not block the rest. Only a
    /// manifest with no capturable asset at all is a populate failure.
    /// Returns the number of entries stored.
    pub async fn install(
        &self,
        client: &Client,
        manifest: &[String],
    ) -> Result<usize, CacheError> {
        let results = stream::iter(manifest.iter().cloned())
            .map(|url| {
                let client = client.clone();
                async move {
                    let outcome = fetch_bytes(&client, &url).await;
                    (url, outcome)
                }
            })
            .buffer_unordered(MAX_CONCURRENT_INSTALLS)
            .collect::<Vec<_>>()
            .await;

        let mut stored = 0;
        for (url, outcome) in results {
            match outcome {
                Ok((content_type, body)) => {
                    match self.store(&url, content_type.as_deref(), &body) {
                        Ok(()) => stored += 1,
                        Err(e) => warn!(url = %url, error = %e, "Failed to store asset"),
                    }
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Failed to download asset");
                }
            }
        }

        if stored == 0 && !manifest.is_empty() {
            return Err(CacheError::Populate(
                "no manifest asset could be captured".to_string(),
            ));
        }

        debug!(stored, total = manifest.len(), "Asset bucket populated");
        Ok(stored)
    }

    /// Delete every bucket whose name is not the current version.
    pub fn activate(&self) -> Result<(), CacheError> {
        let entries = std::fs::read_dir(&self.buckets_dir).map_err(CacheError::Open)?;

        for entry in entries.flatten() {
            let name = entry.file_name();
            if name.to_string_lossy() != self.version {
                debug!(bucket = %name.to_string_lossy(), "Deleting stale cache bucket");
                if let Err(e) = std::fs::remove_dir_all(entry.path()) {
                    warn!(bucket = %name.to_string_lossy(), error = %e, "Failed to delete stale bucket");
                }
            }
        }
        Ok(())
    }

    /// Fetch a URL through the cache layer.
    ///
    /// Dynamic API requests always go to the network. Everything else is
    /// cache-first: a stored entry wins, otherwise the network response
    /// passes through without being re-captured. A network failure with
    /// no stored fallback propagates to the caller.
    pub async fn fetch(&self, client: &Client, url: &str) -> anyhow::Result<Asset> {
        if self.is_dynamic(url) {
            let (content_type, body) = fetch_bytes(client, url).await?;
            return Ok(Asset {
                url: url.to_string(),
                content_type,
                body,
                source: AssetSource::Network,
            });
        }

        if let Some(asset) = self.lookup(url) {
            return Ok(asset);
        }

        let (content_type, body) = fetch_bytes(client, url).await?;
        Ok(Asset {
            url: url.to_string(),
            content_type,
            body,
            source: AssetSource::Network,
        })
    }

    /// Capture a response body into the bucket.
    fn store(&self, url: &str, content_type: Option<&str>, body: &[u8]) -> anyhow::Result<()> {
        let (body_path, meta_path) = self.entry_paths(url);

        let meta = EntryMeta {
            url: url.to_string(),
            content_type: content_type.map(str::to_string),
            stored_at: Utc::now(),
        };

        std::fs::write(&body_path, body)?;
        std::fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)?;
        Ok(())
    }

    /// Look up a stored entry, logging and skipping unreadable ones.
    fn lookup(&self, url: &str) -> Option<Asset> {
        let (body_path, meta_path) = self.entry_paths(url);
        if !body_path.exists() {
            return None;
        }

        let body = match std::fs::read(&body_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to read cached asset body");
                return None;
            }
        };

        let content_type = read_meta(&meta_path).and_then(|meta| meta.content_type);

        Some(Asset {
            url: url.to_string(),
            content_type,
            body,
            source: AssetSource::Cache,
        })
    }

    /// Names of the buckets currently on disk.
    pub fn bucket_names(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.buckets_dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn read_meta(path: &Path) -> Option<EntryMeta> {
    let contents = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

async fn fetch_bytes(client: &Client, url: &str) -> anyhow::Result<(Option<String>, Vec<u8>)> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("{} returned {}", url, status);
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let body = response.bytes().await?.to_vec();
    Ok((content_type, body))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // Connection-refused origin: any real fetch against it fails fast.
    const DEAD_ORIGIN: &str = "http://127.0.0.1:1/";

    fn open_store(dir: &TempDir, version: &str) -> AssetStore {
        AssetStore::open(dir.path().join("buckets"), version, DEAD_ORIGIN).unwrap()
    }

    #[test]
    fn test_activate_purges_stale_buckets() {
        let dir = TempDir::new().unwrap();

        let v1 = open_store(&dir, "nearbike-assets-v1");
        v1.store("https://example.com/style.css", Some("text/css"), b"body{}")
            .unwrap();

        let v2 = open_store(&dir, "nearbike-assets-v2");
        v2.store("https://example.com/style.css", Some("text/css"), b"body{}")
            .unwrap();

        v2.activate().unwrap();

        assert_eq!(v2.bucket_names(), vec!["nearbike-assets-v2".to_string()]);
    }

    #[test]
    fn test_store_then_lookup_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, "nearbike-assets-v1");

        store
            .store("https://example.com/app.js", Some("text/javascript"), b"console")
            .unwrap();

        let asset = store.lookup("https://example.com/app.js").unwrap();
        assert_eq!(asset.body, b"console");
        assert_eq!(asset.content_type.as_deref(), Some("text/javascript"));
        assert_eq!(asset.source, AssetSource::Cache);

        assert!(store.lookup("https://example.com/missing.js").is_none());
    }

    #[tokio::test]
    async fn test_fetch_serves_static_assets_from_cache() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, "nearbike-assets-v1");

        // The host does not exist; a cache hit is the only way this works.
        store
            .store("https://static.invalid/index.html", Some("text/html"), b"<html>")
            .unwrap();

        let client = Client::new();
        let asset = store
            .fetch(&client, "https://static.invalid/index.html")
            .await
            .unwrap();
        assert_eq!(asset.source, AssetSource::Cache);
        assert_eq!(asset.body, b"<html>");
    }

    #[tokio::test]
    async fn test_fetch_never_serves_api_requests_from_cache() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, "nearbike-assets-v1");

        let api_url = format!("{}v2/networks/bikesampa", DEAD_ORIGIN);

        // Even with a stored entry for the API URL, fetch must go live.
        store.store(&api_url, Some("application/json"), b"{}").unwrap();
        assert!(store.is_dynamic(&api_url));

        let client = Client::new();
        let result = store.fetch(&client, &api_url).await;
        assert!(result.is_err(), "API request must not fall back to the bucket");
    }

    #[tokio::test]
    async fn test_install_with_unreachable_manifest_is_a_populate_failure() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, "nearbike-assets-v1");

        let manifest = vec![format!("{}index.html", "http://127.0.0.1:1/shell/")];
        let result = store.install(&Client::new(), &manifest).await;
        assert!(matches!(result, Err(CacheError::Populate(_))));

        // An empty manifest is fine: nothing to capture, nothing failed
        let stored = store.install(&Client::new(), &[]).await.unwrap();
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn test_fetch_fails_without_cached_fallback() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir, "nearbike-assets-v1");

        let client = Client::new();
        let result = store
            .fetch(&client, "http://127.0.0.1:1/static/missing.css")
            .await;
        assert!(result.is_err());
    }
}

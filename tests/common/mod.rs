//! Shared utilities for end-to-end tests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use form_relay::config::ServiceConfig;
use form_relay::lifecycle::Service;
use form_relay::store::{Store, StoreDocument};
use tempfile::TempDir;

/// A site root with the three fixed pages and one stylesheet.
pub fn site_with_pages() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<form method=\"post\"></form>").unwrap();
    std::fs::write(dir.path().join("message.html"), "<p>Thanks!</p>").unwrap();
    std::fs::write(dir.path().join("error.html"), "<p>Nothing here</p>").unwrap();
    std::fs::write(dir.path().join("style.css"), "p { color: red }").unwrap();
    dir
}

pub fn store_path(dir: &Path) -> PathBuf {
    dir.join("storage").join("data.json")
}

/// Config serving `dir` on ephemeral ports, storing under `dir/storage`.
pub fn test_config(dir: &Path) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.http.bind_address = "127.0.0.1:0".into();
    config.http.site_root = dir.to_string_lossy().into_owned();
    config.ingest.bind_address = "127.0.0.1:0".into();
    config.store.path = store_path(dir).to_string_lossy().into_owned();
    config
}

pub async fn start_service(dir: &Path) -> Service {
    Service::start(test_config(dir)).await.unwrap()
}

/// HTTP client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

/// Poll the store until it holds `expected` entries.
pub async fn wait_for_entries(path: &Path, expected: usize) -> StoreDocument {
    let store = Store::new(path);
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(doc) = store.load().await {
            if doc.len() >= expected {
                return doc;
            }
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "store never reached {expected} entries"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

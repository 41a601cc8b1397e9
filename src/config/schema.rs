//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the form relay service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP front end settings.
    pub http: HttpConfig,

    /// Where submitted bodies are forwarded.
    pub relay: RelayConfig,

    /// Datagram listener settings.
    pub ingest: IngestConfig,

    /// Document store settings.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP front end configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Directory holding `index.html`, `message.html`, `error.html` and
    /// any other assets served by the wildcard route.
    pub site_root: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Largest POST body accepted for relaying.
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            site_root: ".".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Datagram destination for submitted bodies (e.g., "127.0.0.1:5000").
    /// When unset, the address the ingest socket actually bound is used,
    /// with an unspecified IP replaced by loopback.
    pub target_address: Option<String>,
}

/// Datagram listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Bind address for the UDP socket.
    pub bind_address: String,

    /// Receive buffer size. Longer datagrams are truncated by the transport.
    pub max_datagram_bytes: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            max_datagram_bytes: 1024,
        }
    }
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON document, relative to the working directory.
    pub path: String,

    /// Pending persist requests the writer task buffers before callers wait.
    ///
    /// The Ingestor awaits each write before receiving its next datagram, so
    /// as the only producer it never has more than one request queued. The
    /// depth only matters when further [`StoreHandle`] clones submit
    /// concurrently.
    ///
    /// [`StoreHandle`]: crate::store::StoreHandle
    pub writer_queue_depth: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "storage/data.json".to_string(),
            writer_queue_depth: 64,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

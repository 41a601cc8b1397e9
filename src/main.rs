//! form-relay
//!
//! Serves a static site, relays form submissions over UDP and stores them
//! in a JSON document.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser                 ┌──────────────────────── form-relay ─────────────────────────┐
//!                             │                                                             │
//!     GET  /, /message.html   │  ┌──────────┐      ┌──────────┐                             │
//!     GET  /<file>  ──────────┼─▶│   http   │─────▶│ statics  │──▶ site root (html/css/…)   │
//!                             │  │  server  │      └──────────┘                             │
//!     POST /<any>   ──────────┼─▶│          │──┐                                          │
//!     ◀── 302 /message.html   │  └──────────┘  │ relay (one UDP datagram)                 │
//!                             │                ▼                                          │
//!                             │  ┌──────────┐      ┌──────────┐      ┌────────────────┐   │
//!                             │  │  ingest  │─────▶│  decode  │─────▶│  store writer  │───┼──▶ storage/data.json
//!                             │  │ (UDP rx) │      └──────────┘      │ load/merge/save│   │
//!                             │  └──────────┘                        └────────────────┘   │
//!                             │                                                             │
//!                             │  lifecycle: startup order, SIGINT/SIGTERM → shutdown both   │
//!                             └─────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use form_relay::config::{load_config, validate_config, ConfigError, ServiceConfig};
use form_relay::lifecycle::Service;
use form_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "form-relay")]
#[command(about = "Static site with form submissions relayed over UDP into a JSON store", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override http.bind_address.
    #[arg(long)]
    http_bind: Option<String>,

    /// Override ingest.bind_address.
    #[arg(long)]
    ingest_bind: Option<String>,

    /// Override relay.target_address.
    #[arg(long)]
    relay_target: Option<String>,

    /// Override store.path.
    #[arg(long)]
    store_path: Option<String>,

    /// Override http.site_root.
    #[arg(long)]
    site_root: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ServiceConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ServiceConfig::default(),
        };

        if let Some(addr) = self.http_bind {
            config.http.bind_address = addr;
        }
        if let Some(addr) = self.ingest_bind {
            config.ingest.bind_address = addr;
        }
        if let Some(addr) = self.relay_target {
            config.relay.target_address = Some(addr);
        }
        if let Some(path) = self.store_path {
            config.store.path = path;
        }
        if let Some(root) = self.site_root {
            config.http.site_root = root;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_logging(&config.observability);
    tracing::info!("form-relay v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        http_bind = %config.http.bind_address,
        ingest_bind = %config.ingest.bind_address,
        site_root = %config.http.site_root,
        store = %config.store.path,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Address already checked by validation.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let service = Service::start(config).await?;
    service.run_until_signal().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize the store file before the ingest socket exists
//! - Spawn the store writer, the Ingestor and the HTTP server
//! - Stop both units on request and wait for them
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - The HTTP listener binds last (traffic only when the relay target exists)

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::ingest::Ingestor;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::wait_for_signal;
use crate::net::{bind_http, parse_addr, Relay, TransportError};
use crate::store::{Store, StoreError, StoreWriter};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("store initialization failed: {0}")]
    Store(#[from] StoreError),

    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Both units, running.
pub struct Service {
    http_addr: SocketAddr,
    ingest_addr: SocketAddr,
    relay_target: SocketAddr,
    shutdown: Shutdown,
    http_task: JoinHandle<std::io::Result<()>>,
    ingest_task: JoinHandle<()>,
    writer_task: JoinHandle<()>,
}

impl Service {
    /// Initialize storage, bind both sockets and start both units.
    pub async fn start(config: ServiceConfig) -> Result<Self, StartupError> {
        let store = Store::new(&config.store.path);
        store.init().await?;
        let (store_handle, writer_task) = StoreWriter::spawn(store, config.store.writer_queue_depth);

        let ingestor = Ingestor::bind(&config.ingest, store_handle).await?;
        let ingest_addr = ingestor.local_addr()?;

        let relay_target = match &config.relay.target_address {
            Some(target) => parse_addr(target)?,
            None => loopback_for(ingest_addr),
        };
        let server = HttpServer::new(&config.http, Relay::new(relay_target));
        let listener = bind_http(&config.http.bind_address).await?;
        let http_addr = listener.local_addr()?;

        let shutdown = Shutdown::new();
        let ingest_task = tokio::spawn(ingestor.run(shutdown.subscribe()));
        let http_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

        tracing::info!(
            http = %http_addr,
            ingest = %ingest_addr,
            relay_target = %relay_target,
            store = %config.store.path,
            "Service started"
        );

        Ok(Self {
            http_addr,
            ingest_addr,
            relay_target,
            shutdown,
            http_task,
            ingest_task,
            writer_task,
        })
    }

    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    pub fn ingest_addr(&self) -> SocketAddr {
        self.ingest_addr
    }

    pub fn relay_target(&self) -> SocketAddr {
        self.relay_target
    }

    /// Run until SIGINT/SIGTERM, then stop.
    pub async fn run_until_signal(self) -> Result<(), StartupError> {
        wait_for_signal().await;
        self.stop().await
    }

    /// Signal both units, wait for them, then for the store writer.
    pub async fn stop(self) -> Result<(), StartupError> {
        self.shutdown.trigger();

        let http_result = match self.http_task.await {
            Ok(result) => result.map_err(StartupError::from),
            Err(e) => {
                tracing::error!(error = %e, "HTTP task panicked");
                Ok(())
            }
        };
        if let Err(e) = self.ingest_task.await {
            tracing::error!(error = %e, "Ingest task panicked");
        }
        // The Ingestor held the last store handle; the writer drains and exits.
        if let Err(e) = self.writer_task.await {
            tracing::error!(error = %e, "Store writer panicked");
        }

        tracing::info!("Service stopped");
        http_result
    }
}

/// Where to reach a socket bound at `addr` from this host.
fn loopback_for(addr: SocketAddr) -> SocketAddr {
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, addr.port())
}

//! Datagram listener that turns wire payloads into stored records.
//!
//! # State Machine
//! ```text
//! Bound → Listening → { Receiving → Persisting } loop → Stopped
//! ```
//!
//! A datagram that fails to decode or persist is logged and dropped; only
//! the shutdown signal ends the loop.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::Local;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::{broadcast, watch};

use crate::config::IngestConfig;
use crate::ingest::decode::{decode_form, DecodeError};
use crate::net::listener::{bind_datagram, TransportError};
use crate::observability::metrics;
use crate::store::{timestamp_key, StoreError, StoreHandle};

/// Pause after a failed receive before polling the socket again.
const RECEIVE_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Lifecycle of the ingest loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestorState {
    /// Socket bound, loop not started.
    Bound,
    /// Waiting for the next datagram.
    Listening,
    /// A datagram arrived and is being decoded.
    Receiving,
    /// A decoded record is being written to the store.
    Persisting,
    /// Loop finished, socket released.
    Stopped,
}

/// Why a single datagram was dropped.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Ingestor {
    socket: UdpSocket,
    store: StoreHandle,
    buffer_size: usize,
    state: watch::Sender<IngestorState>,
}

impl Ingestor {
    /// Wrap an already bound socket.
    pub fn new(socket: UdpSocket, store: StoreHandle, buffer_size: usize) -> Self {
        let (state, _) = watch::channel(IngestorState::Bound);
        Self {
            socket,
            store,
            buffer_size,
            state,
        }
    }

    /// Bind the configured address. Failure here is fatal for the unit.
    pub async fn bind(config: &IngestConfig, store: StoreHandle) -> Result<Self, TransportError> {
        let socket = bind_datagram(&config.bind_address).await?;
        Ok(Self::new(socket, store, config.max_datagram_bytes))
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Observe state transitions, e.g. to wait for `Stopped`.
    pub fn subscribe_state(&self) -> watch::Receiver<IngestorState> {
        self.state.subscribe()
    }

    /// Serve datagrams until `shutdown` fires (or its sender is dropped).
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut buf = vec![0u8; self.buffer_size];
        self.state.send_replace(IngestorState::Listening);
        tracing::info!(
            address = ?self.socket.local_addr().ok(),
            buffer_size = self.buffer_size,
            "Ingestor listening"
        );

        loop {
            let received = tokio::select! {
                received = self.socket.recv_from(&mut buf) => received,
                _ = shutdown.recv() => {
                    tracing::info!("Ingestor received shutdown signal");
                    break;
                }
            };

            match received {
                Ok((len, peer)) => {
                    self.state.send_replace(IngestorState::Receiving);
                    self.process(&buf[..len], peer).await;
                    self.state.send_replace(IngestorState::Listening);
                }
                Err(e) => {
                    // e.g. ICMP port-unreachable surfacing on some platforms
                    tracing::warn!(error = %e, "Datagram receive failed");
                    tokio::select! {
                        _ = tokio::time::sleep(RECEIVE_RETRY_DELAY) => {}
                        _ = shutdown.recv() => {
                            tracing::info!("Ingestor received shutdown signal");
                            break;
                        }
                    }
                }
            }
        }

        let Self { socket, state, .. } = self;
        drop(socket);
        state.send_replace(IngestorState::Stopped);
        tracing::info!("Ingestor stopped");
    }

    /// Decode one payload and persist it under a fresh timestamp key.
    ///
    /// Returns the number of entries in the document after the write.
    pub async fn ingest(&self, payload: &[u8]) -> Result<usize, IngestError> {
        let record = decode_form(payload)?;
        let key = timestamp_key(Local::now());

        self.state.send_replace(IngestorState::Persisting);
        let entries = self.store.persist(key, record).await?;
        Ok(entries)
    }

    async fn process(&self, payload: &[u8], peer: SocketAddr) {
        match self.ingest(payload).await {
            Ok(entries) => {
                metrics::record_datagram("stored");
                tracing::info!(peer = %peer, bytes = payload.len(), entries, "Submission stored");
            }
            Err(IngestError::Decode(e)) => {
                metrics::record_datagram("malformed");
                tracing::error!(
                    peer = %peer,
                    payload = %String::from_utf8_lossy(payload),
                    error = %e,
                    "Failed to parse submission"
                );
            }
            Err(IngestError::Store(e)) => {
                metrics::record_datagram("store_failed");
                tracing::error!(
                    peer = %peer,
                    payload = %String::from_utf8_lossy(payload),
                    error = %e,
                    "Failed to persist submission"
                );
            }
        }
    }
}

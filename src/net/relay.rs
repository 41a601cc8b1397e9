//! Fire-and-forget forwarding of submitted bodies.
//!
//! Each call binds a fresh ephemeral socket, sends the payload as a single
//! datagram and drops the socket. There is no acknowledgement and no retry:
//! a lost datagram is lost silently, and the HTTP client is never told.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;

use crate::net::listener::TransportError;
use crate::observability::metrics;

/// Send `payload` to `destination` as one datagram.
pub async fn forward(payload: &[u8], destination: SocketAddr) -> Result<(), TransportError> {
    let local: SocketAddr = if destination.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };

    let socket = UdpSocket::bind(local)
        .await
        .map_err(|source| TransportError::Bind { address: local, source })?;

    socket
        .send_to(payload, destination)
        .await
        .map_err(|source| TransportError::Send {
            address: destination,
            source,
        })?;

    Ok(())
}

/// The HTTP layer's view of the relay: a fixed destination.
#[derive(Debug, Clone, Copy)]
pub struct Relay {
    destination: SocketAddr,
}

impl Relay {
    pub fn new(destination: SocketAddr) -> Self {
        Self { destination }
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    /// Forward `payload`, logging instead of returning any failure.
    pub async fn send(&self, payload: &[u8]) {
        match forward(payload, self.destination).await {
            Ok(()) => {
                metrics::record_relay("sent");
                tracing::debug!(
                    destination = %self.destination,
                    bytes = payload.len(),
                    "Relayed submission"
                );
            }
            Err(e) => {
                metrics::record_relay("failed");
                tracing::warn!(error = %e, bytes = payload.len(), "Relay failed, submission dropped");
            }
        }
    }
}

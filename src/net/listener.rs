//! Socket binding for both units.
//!
//! # Responsibilities
//! - Parse configured addresses
//! - Bind the HTTP TCP listener and the ingest UDP socket
//! - Report failures as [`TransportError`], which is fatal at startup

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::{TcpListener, UdpSocket};

/// Socket-level failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The configured address does not parse.
    #[error("invalid address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// Failed to bind to address.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Failed to send a datagram.
    #[error("failed to send to {address}: {source}")]
    Send {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Parse a configured `host:port` string.
pub fn parse_addr(address: &str) -> Result<SocketAddr, TransportError> {
    address.parse().map_err(|source| TransportError::Address {
        address: address.to_string(),
        source,
    })
}

/// Bind the HTTP listener.
pub async fn bind_http(address: &str) -> Result<TcpListener, TransportError> {
    let addr = parse_addr(address)?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| TransportError::Bind { address: addr, source })?;

    tracing::info!(
        address = %listener.local_addr().unwrap_or(addr),
        "HTTP listener bound"
    );
    Ok(listener)
}

/// Bind the ingest datagram socket.
pub async fn bind_datagram(address: &str) -> Result<UdpSocket, TransportError> {
    let addr = parse_addr(address)?;
    let socket = UdpSocket::bind(addr)
        .await
        .map_err(|source| TransportError::Bind { address: addr, source })?;

    tracing::info!(
        address = %socket.local_addr().unwrap_or(addr),
        "Datagram socket bound"
    );
    Ok(socket)
}

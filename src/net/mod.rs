//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     listener.rs (bind TCP for HTTP, bind UDP for ingest)
//!
//! Per POST:
//!     HTTP handler → relay.rs (ephemeral UDP socket → one datagram) → ingest socket
//! ```
//!
//! # Design Decisions
//! - Bind failures are fatal; send failures are logged and swallowed
//! - One datagram per submission, no framing

pub mod listener;
pub mod relay;

pub use listener::{bind_datagram, bind_http, parse_addr, TransportError};
pub use relay::{forward, Relay};

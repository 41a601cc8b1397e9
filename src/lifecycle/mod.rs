//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Init store file → Spawn writer → Bind ingest → Bind HTTP → Spawn both units
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → HTTP drains, Ingestor releases socket
//!     → writer exits once the last store handle is gone
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: storage first, then ingest, then HTTP
//! - The two units share no memory; they meet only on the wire and on disk

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{Service, StartupError};

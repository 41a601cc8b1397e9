//! Datagram ingestion subsystem.
//!
//! # Data Flow
//! ```text
//! UDP datagram (raw form body, ≤ max_datagram_bytes)
//!     → ingestor.rs (receive loop)
//!     → decode.rs (form body → SubmissionRecord)
//!     → store writer (timestamp key → load/merge/save)
//! ```
//!
//! # Design Decisions
//! - One datagram is one submission; no framing, no acknowledgement
//! - Per-datagram failures are contained; the loop only ends on shutdown

pub mod decode;
pub mod ingestor;

pub use decode::{decode_form, DecodeError};
pub use ingestor::{IngestError, Ingestor, IngestorState};

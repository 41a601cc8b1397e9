//! Durable storage subsystem.
//!
//! # Data Flow
//! ```text
//! Ingestor (decoded record + timestamp key)
//!     → writer.rs (StoreHandle → queue → single writer task)
//!     → document.rs (load whole file → merge → save whole file)
//!     → storage/data.json
//! ```
//!
//! # Design Decisions
//! - One JSON object on disk, rewritten in full on every submission
//! - Only the writer task touches the file after startup, so concurrent
//!   submissions cannot overwrite each other's entries
//! - No partial-write protection; a crash mid-save may corrupt the file

pub mod document;
pub mod writer;

pub use document::{timestamp_key, Store, StoreDocument, StoreError, SubmissionRecord};
pub use writer::{StoreHandle, StoreWriter};

//! Form relay library: static site front end, UDP relay, UDP ingest and a
//! JSON document store.

pub mod config;
pub mod http;
pub mod ingest;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod store;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use ingest::Ingestor;
pub use lifecycle::{Service, Shutdown};
pub use store::{Store, StoreDocument, SubmissionRecord};

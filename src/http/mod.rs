//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → request.rs (request ID for tracing)
//!     → GET: statics.rs (resolve page or file) → response.rs
//!     → POST: net::relay (one datagram) → response.rs (302)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod statics;

pub use request::{request_id, MakeRequestUuidV4, X_REQUEST_ID};
pub use server::HttpServer;
pub use statics::SiteRoot;

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CLI overrides applied by the binary
//!     → ServiceConfig (validated, immutable)
//!     → handed by value to each unit at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::HttpConfig;
pub use schema::IngestConfig;
pub use schema::ObservabilityConfig;
pub use schema::RelayConfig;
pub use schema::ServiceConfig;
pub use schema::StoreConfig;
pub use validation::{validate_config, ValidationError};

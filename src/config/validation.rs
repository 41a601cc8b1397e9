//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that every address parses as a socket address
//! - Validate value ranges (timeouts > 0, buffer sizes within UDP limits)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// Largest payload a single UDP datagram can carry over IPv4.
pub const MAX_UDP_PAYLOAD: usize = 65_507;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} must be at most {max}, got {value}")]
    TooLarge {
        field: &'static str,
        value: usize,
        max: usize,
    },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("observability.log_format must be 'pretty' or 'json', got '{0}'")]
    LogFormat(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "http.bind_address", &config.http.bind_address);
    if let Some(target) = &config.relay.target_address {
        check_address(&mut errors, "relay.target_address", target);
    }
    check_address(&mut errors, "ingest.bind_address", &config.ingest.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.http.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "http.request_timeout_secs" });
    }
    if config.http.max_body_bytes == 0 {
        errors.push(ValidationError::Zero { field: "http.max_body_bytes" });
    }
    if config.http.site_root.is_empty() {
        errors.push(ValidationError::Empty { field: "http.site_root" });
    }

    if config.ingest.max_datagram_bytes == 0 {
        errors.push(ValidationError::Zero { field: "ingest.max_datagram_bytes" });
    } else if config.ingest.max_datagram_bytes > MAX_UDP_PAYLOAD {
        errors.push(ValidationError::TooLarge {
            field: "ingest.max_datagram_bytes",
            value: config.ingest.max_datagram_bytes,
            max: MAX_UDP_PAYLOAD,
        });
    }

    if config.store.path.is_empty() {
        errors.push(ValidationError::Empty { field: "store.path" });
    }
    if config.store.writer_queue_depth == 0 {
        errors.push(ValidationError::Zero { field: "store.writer_queue_depth" });
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::LogFormat(other.to_string())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that an HTTP→HTTPS redirect has somewhere to point
//! - Validate value ranges (limits > 0, distinct ports)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before the server is built; any error is fatal at startup

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("redirect_http_to_https requires server_address")]
    RedirectWithoutAddress,
    #[error("redirect_http_to_https requires TLS to be configured")]
    RedirectWithoutTls,
    #[error("http_port and https_port must differ when redirecting")]
    PortConflict,
    #[error("limits.{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

/// Check `config` on its own. `has_tls` reports whether an encrypted
/// listener will be available, which may come from outside the file.
pub fn validate_config(config: &ServerConfig, has_tls: bool) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.redirect_http_to_https {
        if config.server_address.as_deref().map_or(true, str::is_empty) {
            errors.push(ValidationError::RedirectWithoutAddress);
        }
        if !has_tls {
            errors.push(ValidationError::RedirectWithoutTls);
        }
        if config.http_port == config.https_port {
            errors.push(ValidationError::PortConflict);
        }
    }

    let limits = &config.limits;
    for (name, value) in [
        ("max_connections", limits.max_connections),
        ("read_chunk_size", limits.read_chunk_size),
        ("max_head_bytes", limits.max_head_bytes),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroLimit(name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (debounce > 0 when watching)
//! - Check addresses and log settings parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ControllerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Overrides are not validated here; bad values are skipped per render

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ControllerConfig;

/// Log levels accepted in `observability.log_level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Check `config` for values that would break the controller at runtime.
pub fn validate_config(config: &ControllerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.template.path.as_os_str().is_empty() {
        errors.push(ValidationError::new("template.path", "must not be empty"));
    }
    if config.template.name.trim().is_empty() {
        errors.push(ValidationError::new("template.name", "must not be empty"));
    }
    if config.output.path.as_os_str().is_empty() {
        errors.push(ValidationError::new("output.path", "must not be empty"));
    }
    if config.snapshot.path.as_os_str().is_empty() {
        errors.push(ValidationError::new("snapshot.path", "must not be empty"));
    }
    if config.snapshot.watch && config.snapshot.debounce_ms == 0 {
        errors.push(ValidationError::new(
            "snapshot.debounce_ms",
            "must be greater than zero when watching",
        ));
    }

    let level = config.observability.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

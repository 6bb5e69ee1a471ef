//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("chat.timezone is not a known IANA zone: {0}")]
    UnknownTimezone(String),
    #[error("chat.reset_period_minutes must be greater than zero")]
    ZeroResetPeriod,
    #[error("maintenance.expiry_interval_secs must be greater than zero")]
    ZeroExpiryInterval,
    #[error("listen.max_line_length must be greater than zero")]
    ZeroLineLength,
    #[error("listen.outbound_queue must be greater than zero")]
    ZeroOutboundQueue,
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    if config.chat.parsed_timezone().is_none() {
        errors.push(ValidationError::UnknownTimezone(config.chat.timezone.clone()));
    }

    // tokio intervals panic on a zero period
    if config.chat.reset_period_minutes == 0 {
        errors.push(ValidationError::ZeroResetPeriod);
    }
    if config.maintenance.expiry_interval_secs == 0 {
        errors.push(ValidationError::ZeroExpiryInterval);
    }

    if config.listen.max_line_length == 0 {
        errors.push(ValidationError::ZeroLineLength);
    }
    // tokio mpsc channels panic on zero capacity
    if config.listen.outbound_queue == 0 {
        errors.push(ValidationError::ZeroOutboundQueue);
    }

    let db_path = Path::new(&config.database.path);
    if config.database.path != ":memory:"
        && let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        errors.push(ValidationError::DatabasePathInvalid(config.database.path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

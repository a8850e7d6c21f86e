//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid retrieval base URL format")]
    InvalidRetrievalUrl,

    #[error("Reference count (top_k) must be at least 1")]
    InvalidTopK,

    #[error("Sessions directory must not be empty")]
    InvalidSessionsDir,

    #[error("Intake thresholds exceed the field schema")]
    InvalidIntakeThresholds,
}

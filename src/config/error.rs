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

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Plan amounts must be positive")]
    InvalidPlanAmount,

    #[error("Basic and premium plan amounts must differ")]
    AmbiguousPlanAmounts,

    #[error("Invalid scheduler poll interval")]
    InvalidPollInterval,

    #[error("Invalid scheduler claim batch size")]
    InvalidClaimBatch,

    #[error("Webhook event retention must be at least one day")]
    InvalidEventRetention,

    #[error("Redirect URLs must be absolute (http:// or https://)")]
    InvalidRedirectUrl,
}

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
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid signature tolerance")]
    InvalidTolerance,

    #[error("Invalid signature header name: {0}")]
    InvalidHeaderName(String),

    #[error("Secret cache TTL exceeds one day")]
    InvalidCacheTtl,

    #[error("Invalid body size limit")]
    InvalidBodyLimit,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Production requires the redis bus transport")]
    InMemoryBusInProduction,
}

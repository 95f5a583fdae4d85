//! Core error types for the exposure engine.
//!
//! Malformed individual records are never errors: they are dropped and logged
//! by the component that sees them. The variants below cover configuration
//! problems only.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load configuration: {0}")]
    ConfigIO(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}


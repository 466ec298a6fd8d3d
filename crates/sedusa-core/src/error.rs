//! Core error types for sedusa-core.
//!
//! Lookup misses (unknown pattern, unknown narrative key) are not errors and
//! never show up here; they resolve to fallbacks at the call site.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for sedusa-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Actuator transport errors
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// Session parameter validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Motif bank or narrative file errors
    #[error("Content error: {0}")]
    Bank(#[from] BankError),
}

/// Errors raised while talking to the actuator.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Remote mode was requested without a connection key
    #[error("an API key is required when device mode is 'handy'")]
    MissingApiKey,

    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The HTTP request could not be completed
    #[error("device API error on PUT /{path}: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The device API answered with a non-success status
    #[error("device API returned HTTP {status} on PUT /{path}")]
    Status { path: String, status: u16 },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Session parameter validation errors.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Value outside the accepted range
    #[error("Value {value} for '{field}' is outside {min}..={max}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Errors reading motif banks or narrative files.
#[derive(Error, Debug)]
pub enum BankError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

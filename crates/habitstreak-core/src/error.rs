//! Core error types for habitstreak-core.
//!
//! This module defines the error hierarchy using thiserror. Streak and rate
//! computations only fail on malformed input; everything else (empty
//! histories, single entries) is a valid degenerate result.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for habitstreak-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Streak or completion-rate input errors
    #[error("Streak error: {0}")]
    Streak(#[from] StreakError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the streak engine and history construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreakError {
    /// `completion_rate` called with an inverted window
    #[error("Invalid range: start date ({start}) is after end date ({end})")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// A history key is not a `YYYY-MM-DD` calendar date
    #[error("Malformed date key '{key}': expected YYYY-MM-DD")]
    MalformedDate { key: String },

    /// A history key does not match the record stored under it
    #[error("History key {key} does not match record date {record_date}")]
    KeyMismatch { key: NaiveDate, record_date: NaiveDate },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required text field was empty
    #[error("'{field}' must not be empty")]
    Empty { field: String },

    /// Text field exceeded its maximum length
    #[error("'{field}' is too long: {len} characters (max {max})")]
    TooLong { field: String, len: usize, max: usize },

    /// Numeric field was NaN or infinite
    #[error("'{field}' must be a finite number, got {value}")]
    NonFinite { field: String, value: f64 },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config directory could not be determined or created
    #[error("Config directory unavailable: {0}")]
    DirUnavailable(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not name a config field
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

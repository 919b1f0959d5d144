//! Core error types for pomotimer-core.
//!
//! Nothing in the engine is fatal. Storage and notification failures are
//! recovered where they happen; these types exist so that the layers which do
//! want to report a failure (setters, the CLI `config` command) can.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::IntervalKind;

/// Core error type for pomotimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

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

/// Errors reading or writing the persisted documents.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed document at {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to serialize document: {0}")]
    Serialize(String),

    #[error("No usable data directory (tried {tried} locations)")]
    NoDataDir { tried: usize },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Key does not exist in the settings document
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Key exists but is maintained by the engine
    #[error("config key '{0}' is read-only")]
    ReadOnly(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Rejected input at the engine's validation boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{kind} duration must be between {min} and {max} minutes (got {minutes})")]
    DurationOutOfRange {
        kind: IntervalKind,
        minutes: u32,
        min: u32,
        max: u32,
    },

    #[error("long break interval must be between {min} and {max} (got {value})")]
    IntervalOutOfRange { value: u32, min: u32, max: u32 },
}

/// Notification sink failures. Always swallowed by the engine.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification backend unavailable: {0}")]
    Unavailable(String),

    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

//! Core error types for powerstreak-core.
//!
//! This module defines the error hierarchy using thiserror. Every variant is
//! recoverable by the caller; none of them should abort the process.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for powerstreak-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Check-in rejections and failures
    #[error("Check-in error: {0}")]
    CheckIn(#[from] CheckInError),

    /// Persistence-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Reasons a check-in attempt is rejected.
///
/// A rejected check-in never mutates the streak state.
#[derive(Error, Debug)]
pub enum CheckInError {
    /// The cooldown gate is closed
    #[error("Check-in not allowed yet: {} seconds of cooldown remaining", remaining.num_seconds())]
    NotAllowed { remaining: chrono::Duration },

    /// Another check-in is still being processed
    #[error("A check-in is already in flight")]
    AlreadyInFlight,

    /// The new state could not be written back
    #[error("Failed to persist streak state: {0}")]
    PersistenceFailure(#[from] StoreError),
}

/// Persistence-specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Stored record could not be decoded
    #[error("Stored streak state is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Filesystem error while locating the store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking store task panicked or was cancelled
    #[error("Store task failed: {0}")]
    TaskFailed(String),

    /// Injected failure (test stores)
    #[error("{0}")]
    Unavailable(String),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// Durations or static tables violate their invariants
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked
                    || err.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::TaskFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_allowed_reports_remaining_seconds() {
        let err = CheckInError::NotAllowed {
            remaining: chrono::Duration::seconds(42),
        };
        assert_eq!(
            err.to_string(),
            "Check-in not allowed yet: 42 seconds of cooldown remaining"
        );
    }

    #[test]
    fn store_error_converts_into_persistence_failure() {
        let err: CheckInError = StoreError::Locked.into();
        assert!(matches!(err, CheckInError::PersistenceFailure(StoreError::Locked)));
    }

    #[test]
    fn invalid_configuration_wraps_into_core_error() {
        let err: CoreError = ConfigError::InvalidConfiguration("reset <= cooldown".into()).into();
        assert!(err.to_string().contains("reset <= cooldown"));
    }
}

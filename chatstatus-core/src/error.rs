//! Error types for chatstatus-core

use thiserror::Error;

/// Main error type for the chatstatus-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A status draft that cannot be saved
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// Custom statuses are turned off in configuration
    #[error("custom statuses are disabled")]
    FeatureDisabled,

    /// User not found
    #[error("user not found: {0}")]
    UserNotFound(String),
}

/// Result type alias for chatstatus-core
pub type Result<T> = std::result::Result<T, Error>;

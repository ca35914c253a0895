//! Error types for Dayjot
//!
//! This module defines the error taxonomy shared by the store adapters,
//! the save/fallback flow, and the collaborators, using `thiserror`.

use thiserror::Error;

/// Main error type for Dayjot operations
///
/// Variants follow the degradation policy of the journaling flow:
/// validation and authentication errors block an action without changing
/// state, persistence errors are recovered by the local fallback, and read
/// errors degrade to local-only history.
#[derive(Error, Debug)]
pub enum JournalError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input rejected before any work was attempted
    #[error("Validation error: {0}")]
    Validation(String),

    /// No signed-in user when one is required
    #[error("Sign in required: {0}")]
    AuthenticationRequired(String),

    /// Sign-in, sign-up, or token errors reported by the auth service
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// A write to the remote row store failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A read from the remote row store failed
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The AI pipeline gateway returned an error
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// The question engine could not produce a question
    #[error("Question unavailable: {0}")]
    Question(String),

    /// A save is already running for this journal flow
    #[error("A save is already in progress")]
    SaveInProgress,

    /// Local storage errors (settings file, SQLite database)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// SQLite errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for Dayjot operations
///
/// Uses `anyhow::Error` so call sites can attach context; callers that need
/// to classify a failure use `downcast_ref::<JournalError>()`.
pub type Result<T> = anyhow::Result<T>;

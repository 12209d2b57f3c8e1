//! Error types for scorebook-state

use thiserror::Error;

/// Errors raised by the SurrealDB handle (connection and query level)
#[derive(Error, Debug)]
pub enum StateError {
    /// Database connection error
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Database query error
    #[error("Database query failed: {0}")]
    Query(String),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Transaction failed
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// Schema setup error
    #[error("Schema setup failed: {0}")]
    SchemaSetup(String),
}

impl From<surrealdb::Error> for StateError {
    fn from(err: surrealdb::Error) -> Self {
        StateError::Query(err.to_string())
    }
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::Serialization(err.to_string())
    }
}

/// Errors surfaced through the storage traits.
///
/// "Not found" variants are kept apart from `Backend` so callers can tell a
/// record that never existed from a store that is unavailable.
#[derive(Error, Debug)]
pub enum StorageError {
    /// No match blob stored under this key
    #[error("match blob not found: {key}")]
    NotFound { key: String },

    /// No scorecard with this id
    #[error("scorecard not found: {id}")]
    ScorecardNotFound { id: String },

    /// A scorecard with this id already exists
    #[error("scorecard already exists: {id}")]
    DuplicateScorecard { id: String },

    /// Another scorecard already carries this share token
    #[error("share token already held by scorecard {holder}")]
    DuplicateShareToken { holder: String },

    /// Backend (database) failure
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Filesystem failure
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded or decoded
    #[error("storage serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<StateError> for StorageError {
    fn from(err: StateError) -> Self {
        StorageError::Backend(err.to_string())
    }
}

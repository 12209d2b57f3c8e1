//! Domain-level error taxonomy for Scorebook.

use scorebook_state::StorageError;

/// Scorebook domain errors.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("match not found: {0}")]
    MatchNotFound(String),

    #[error("match expired: {0}")]
    MatchExpired(String),

    #[error("corrupt match record {id}: {reason}")]
    CorruptMatch { id: String, reason: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("scorecard not found: {0}")]
    ScorecardNotFound(String),

    #[error("no public scorecard for share token {0}")]
    SharedScorecardNotFound(String),

    #[error("scorecard {id} is not owned by {owner}")]
    Forbidden { id: String, owner: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScoreError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        ScoreError::Validation(msg.into())
    }
}

/// Result type for Scorebook domain operations.
pub type Result<T> = std::result::Result<T, ScoreError>;

//! Storage trait definitions for Scorebook
//!
//! These traits define the core storage abstractions:
//! - `MatchStore`: Opaque match blobs keyed by match id
//! - `ScorecardStore`: CRUD over user-authored scorecards
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// MatchStore: opaque match blobs
// ---------------------------------------------------------------------------

/// A serialized match as the store sees it.
///
/// The payload is never interpreted here: decoding (and deciding that a
/// payload is corrupt) is the reader's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchBlob {
    /// Match identifier the blob is stored under
    pub key: String,
    /// JSON-encoded match state
    pub payload: String,
    /// Creation time of the match, used for retention
    pub created_at: DateTime<Utc>,
}

impl MatchBlob {
    pub fn new(key: impl Into<String>, payload: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
            created_at,
        }
    }
}

/// Key-value store for match state.
///
/// Guarantees:
/// - `put` replaces any blob previously stored under the same key (last write wins).
/// - `get` returns `Ok(None)` for a missing key; `Err` only for backend failures.
/// - `delete` is a no-op for a missing key.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Store a blob under `blob.key`.
    async fn put(&self, blob: MatchBlob) -> StorageResult<()>;

    /// Fetch the blob stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<Option<MatchBlob>>;

    /// Remove the blob stored under `key`.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Every blob in the store, in no particular order.
    async fn list(&self) -> StorageResult<Vec<MatchBlob>>;
}

// ---------------------------------------------------------------------------
// ScorecardStore: user-authored scorecards
// ---------------------------------------------------------------------------

/// Identity of the user owning a scorecard
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a scorecard
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScorecardId(pub String);

impl ScorecardId {
    /// Generate a new random ScorecardId
    pub fn new() -> Self {
        ScorecardId(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ScorecardId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScorecardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sport/template family of a scorecard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScorecardKind {
    Cricket,
    Football,
    Custom,
}

impl std::fmt::Display for ScorecardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScorecardKind::Cricket => "Cricket",
            ScorecardKind::Football => "Football",
            ScorecardKind::Custom => "Custom",
        };
        f.write_str(s)
    }
}

impl FromStr for ScorecardKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cricket" => Ok(ScorecardKind::Cricket),
            "football" => Ok(ScorecardKind::Football),
            "custom" => Ok(ScorecardKind::Custom),
            other => Err(format!(
                "unknown scorecard kind '{other}' (expected Cricket, Football or Custom)"
            )),
        }
    }
}

/// Input type of a scorecard field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Select,
    Checkbox,
}

/// One column of a scorecard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardField {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Display hint only; stores and services accept cards with unfilled
    /// required fields.
    #[serde(default)]
    pub required: bool,
    pub order: u32,
}

/// Value entered for a field: text, number or checkbox state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// A value bound to a field id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardValue {
    pub field_id: String,
    pub value: FieldValue,
}

/// Full scorecard record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardRecord {
    pub id: ScorecardId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: ScorecardKind,
    pub fields: Vec<ScorecardField>,
    #[serde(default)]
    pub values: Vec<ScorecardValue>,
    pub created_by: UserId,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScorecardRecord {
    /// Look up the value entered for `field_id`, if any.
    pub fn value_of(&self, field_id: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|v| v.field_id == field_id)
            .map(|v| &v.value)
    }
}

/// Scorecard persistence.
///
/// Semantics:
/// - `insert` fails with `DuplicateScorecard` if the id is taken.
/// - `insert` and `replace` fail with `DuplicateShareToken` if another
///   record already carries the same share token.
/// - `replace` overwrites the stored record wholesale; fails with
///   `ScorecardNotFound` if the id is unknown.
/// - `list_by_owner` returns newest first (by `created_at`).
/// - `delete` returns whether a record was removed.
#[async_trait]
pub trait ScorecardStore: Send + Sync {
    /// Persist a new scorecard.
    async fn insert(&self, record: ScorecardRecord) -> StorageResult<ScorecardRecord>;

    /// Fetch a scorecard by id.
    async fn get(&self, id: &ScorecardId) -> StorageResult<Option<ScorecardRecord>>;

    /// Fetch the scorecard carrying this share token.
    async fn get_by_share_token(&self, token: &str) -> StorageResult<Option<ScorecardRecord>>;

    /// All scorecards created by `owner`, newest first.
    async fn list_by_owner(&self, owner: &UserId) -> StorageResult<Vec<ScorecardRecord>>;

    /// Overwrite an existing scorecard.
    async fn replace(&self, record: ScorecardRecord) -> StorageResult<ScorecardRecord>;

    /// Remove a scorecard by id.
    async fn delete(&self, id: &ScorecardId) -> StorageResult<bool>;
}

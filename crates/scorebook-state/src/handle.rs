//! SurrealDB Handle - Connection and Operations
//!
//! Manages the connection and provides methods for:
//! - match blobs (put / get / delete / list)
//! - scorecards (insert / get / share-token lookup / list by owner / replace / delete)
//!
//! Supports in-memory, local on-disk (SurrealKV) and cloud (WebSocket) connections.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::sql::Datetime as SurrealDatetime;
use surrealdb::Surreal;
use tracing::{debug, info, instrument};

use crate::error::StateError;
use crate::storage_traits::{
    MatchBlob, ScorecardField, ScorecardId, ScorecardKind, ScorecardRecord, ScorecardValue,
    StorageResult, UserId,
};
use crate::Result;
use crate::StorageError;

const DEFAULT_NAMESPACE: &str = "scorebook";
const DEFAULT_DATABASE: &str = "main";

/// Configuration for a remote SurrealDB connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket endpoint URL (e.g., "wss://xxx.aws-use1.surrealdb.cloud")
    pub endpoint: String,
    /// Database username
    pub username: String,
    /// Database password
    pub password: String,
    /// Namespace (default: "scorebook")
    pub namespace: String,
    /// Database name (default: "main")
    pub database: String,
    /// Whether this is a root user (true) or database user (false)
    pub is_root: bool,
}

impl DbConfig {
    /// Create a new configuration for a database user
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            is_root: false,
        }
    }

    /// Set custom namespace
    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    /// Set custom database
    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    /// Set whether this is a root user
    pub fn with_root(mut self, is_root: bool) -> Self {
        self.is_root = is_root;
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - SURREALDB_ENDPOINT (required)
    /// - SURREALDB_USERNAME (required)
    /// - SURREALDB_PASSWORD (required)
    /// - SURREALDB_NAMESPACE (optional, default: "scorebook")
    /// - SURREALDB_DATABASE (optional, default: "main")
    /// - SURREALDB_ROOT (optional, default: "false") - set to "true" for root users
    pub fn from_env() -> std::result::Result<Self, String> {
        let endpoint =
            std::env::var("SURREALDB_ENDPOINT").map_err(|_| "SURREALDB_ENDPOINT not set")?;
        let username =
            std::env::var("SURREALDB_USERNAME").map_err(|_| "SURREALDB_USERNAME not set")?;
        let password =
            std::env::var("SURREALDB_PASSWORD").map_err(|_| "SURREALDB_PASSWORD not set")?;
        let namespace = std::env::var("SURREALDB_NAMESPACE")
            .unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string());
        let database =
            std::env::var("SURREALDB_DATABASE").unwrap_or_else(|_| DEFAULT_DATABASE.to_string());
        let is_root = std::env::var("SURREALDB_ROOT")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        Ok(Self {
            endpoint,
            username,
            password,
            namespace,
            database,
            is_root,
        })
    }
}

/// SurrealDB connection handle for Scorebook
#[derive(Clone)]
pub struct SurrealHandle {
    db: Surreal<Any>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DbMatchBlob {
    key: String,
    payload: String,
    created_at: SurrealDatetime,
}

impl DbMatchBlob {
    fn from_blob(blob: MatchBlob) -> Self {
        Self {
            key: blob.key,
            payload: blob.payload,
            created_at: SurrealDatetime::from(blob.created_at),
        }
    }

    fn into_blob(self) -> MatchBlob {
        MatchBlob {
            key: self.key,
            payload: self.payload,
            created_at: DateTime::<Utc>::from(self.created_at),
        }
    }
}

/// Row shape of the `scorecards` table. `id` is reserved for the SurrealDB
/// record id, so the scorecard id lives in `scorecard_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DbScorecardRecord {
    scorecard_id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    kind: ScorecardKind,
    fields: Vec<ScorecardField>,
    #[serde(default)]
    values: Vec<ScorecardValue>,
    created_by: String,
    is_public: bool,
    #[serde(default)]
    share_token: Option<String>,
    created_at: SurrealDatetime,
    updated_at: SurrealDatetime,
}

impl DbScorecardRecord {
    fn from_record(record: ScorecardRecord) -> Self {
        Self {
            scorecard_id: record.id.0,
            title: record.title,
            description: record.description,
            kind: record.kind,
            fields: record.fields,
            values: record.values,
            created_by: record.created_by.0,
            is_public: record.is_public,
            share_token: record.share_token,
            created_at: SurrealDatetime::from(record.created_at),
            updated_at: SurrealDatetime::from(record.updated_at),
        }
    }

    fn into_record(self) -> ScorecardRecord {
        ScorecardRecord {
            id: ScorecardId(self.scorecard_id),
            title: self.title,
            description: self.description,
            kind: self.kind,
            fields: self.fields,
            values: self.values,
            created_by: UserId(self.created_by),
            is_public: self.is_public,
            share_token: self.share_token,
            created_at: DateTime::<Utc>::from(self.created_at),
            updated_at: DateTime::<Utc>::from(self.updated_at),
        }
    }
}

fn backend(err: surrealdb::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

impl SurrealHandle {
    /// Connect to SurrealDB in-memory and set up schema
    #[instrument(skip_all)]
    pub async fn setup_db() -> Result<Self> {
        info!("Connecting to SurrealDB (in-memory)");
        let handle = Self::connect_url("mem://").await?;
        info!("SurrealDB connected and schema initialized");
        Ok(handle)
    }

    /// Open (or create) an on-disk SurrealKV database at `path`
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn setup_local(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StateError::Connection(format!("Failed to create {:?}: {}", parent, e)))?;
        }
        info!("Opening local SurrealKV database");
        Self::connect_url(&format!("surrealkv://{}", path.display())).await
    }

    async fn connect_url(url: &str) -> Result<Self> {
        let db = surrealdb::engine::any::connect(url)
            .await
            .map_err(|e| StateError::Connection(format!("Failed to connect to {}: {}", url, e)))?;

        db.use_ns(DEFAULT_NAMESPACE)
            .use_db(DEFAULT_DATABASE)
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        let handle = SurrealHandle { db };
        handle.init_schema().await?;
        Ok(handle)
    }

    /// Connect to a remote SurrealDB with credentials
    ///
    /// # Example
    /// ```ignore
    /// let config = DbConfig::new(
    ///     "wss://xxx.aws-use1.surrealdb.cloud",
    ///     "your_username",
    ///     "your_password",
    /// );
    /// let handle = SurrealHandle::setup_remote(config).await?;
    /// ```
    #[instrument(skip(config), fields(endpoint = %config.endpoint, namespace = %config.namespace, database = %config.database))]
    pub async fn setup_remote(config: DbConfig) -> Result<Self> {
        info!("Connecting to remote SurrealDB (root={})", config.is_root);

        let db = surrealdb::engine::any::connect(&config.endpoint)
            .await
            .map_err(|e| {
                StateError::Connection(format!("Failed to connect to {}: {}", config.endpoint, e))
            })?;

        if config.is_root {
            db.signin(Root {
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| StateError::Connection(format!("Root authentication failed: {}", e)))?;
        } else {
            db.signin(Database {
                namespace: &config.namespace,
                database: &config.database,
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| {
                StateError::Connection(format!("Database authentication failed: {}", e))
            })?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| {
                StateError::Connection(format!("Failed to select namespace/database: {}", e))
            })?;

        let handle = SurrealHandle { db };
        handle.init_schema().await?;

        info!("Remote SurrealDB connected and schema initialized");
        Ok(handle)
    }

    /// Connect using environment variables, falling back to a local database
    ///
    /// If SURREALDB_ENDPOINT (+ credentials) is set, connects remotely.
    /// If SCOREBOOK_DB_URL is set, connects to that URL.
    /// Otherwise opens the SurrealKV database at `local_path`.
    #[instrument(skip_all)]
    pub async fn setup_from_env(local_path: impl AsRef<Path>) -> Result<Self> {
        if let Ok(config) = DbConfig::from_env() {
            info!("Remote config found, connecting to SurrealDB");
            return Self::setup_remote(config).await;
        }

        if let Ok(url) = std::env::var("SCOREBOOK_DB_URL") {
            info!("SCOREBOOK_DB_URL found, connecting to {}", url);
            return Self::connect_url(&url).await;
        }

        Self::setup_local(local_path).await
    }

    /// Initialize the database schema
    async fn init_schema(&self) -> Result<()> {
        debug!("Initializing Scorebook schema");

        let schema = r#"
            -- Match blobs (opaque JSON keyed by match id)
            DEFINE TABLE IF NOT EXISTS matches SCHEMAFULL;
            DEFINE FIELD IF NOT EXISTS key ON matches TYPE string;
            DEFINE FIELD IF NOT EXISTS payload ON matches TYPE string;
            DEFINE FIELD IF NOT EXISTS created_at ON matches TYPE datetime;
            DEFINE INDEX IF NOT EXISTS idx_match_key ON matches FIELDS key UNIQUE;

            -- Scorecards (field/value lists are free-form)
            DEFINE TABLE IF NOT EXISTS scorecards SCHEMALESS;
            DEFINE INDEX IF NOT EXISTS idx_scorecard_id ON scorecards FIELDS scorecard_id UNIQUE;
            DEFINE INDEX IF NOT EXISTS idx_scorecard_owner ON scorecards FIELDS created_by, created_at;
            -- Share tokens are unique; checked on write since most cards have none
            DEFINE INDEX IF NOT EXISTS idx_scorecard_share_token ON scorecards FIELDS share_token;
        "#;

        self.db
            .query(schema)
            .await
            .map_err(|e| StateError::SchemaSetup(e.to_string()))?
            .check()
            .map_err(|e| StateError::SchemaSetup(e.to_string()))?;

        debug!("Schema initialized successfully");
        Ok(())
    }

    // ========== Match Blob Operations ==========

    /// Insert or overwrite the blob stored under `blob.key`
    #[instrument(skip(self, blob), fields(key = %blob.key))]
    pub async fn match_put(&self, blob: MatchBlob) -> StorageResult<()> {
        let existing = self.match_get(&blob.key).await?;
        let record = DbMatchBlob::from_blob(blob);

        if existing.is_some() {
            let DbMatchBlob {
                key,
                payload,
                created_at,
            } = record;
            self.db
                .query("UPDATE matches SET payload = $payload, created_at = $created_at WHERE key = $key")
                .bind(("payload", payload))
                .bind(("created_at", created_at))
                .bind(("key", key))
                .await
                .map_err(backend)?
                .check()
                .map_err(backend)?;
        } else {
            let created: Option<DbMatchBlob> = self
                .db
                .create("matches")
                .content(record)
                .await
                .map_err(backend)?;
            if created.is_none() {
                return Err(StorageError::Backend(
                    "failed to create match record".to_string(),
                ));
            }
        }

        debug!("Match blob saved");
        Ok(())
    }

    /// Fetch the blob stored under `key`
    #[instrument(skip(self))]
    pub async fn match_get(&self, key: &str) -> StorageResult<Option<MatchBlob>> {
        let key_owned = key.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM matches WHERE key = $key")
            .bind(("key", key_owned))
            .await
            .map_err(backend)?;

        let rows: Vec<DbMatchBlob> = result.take(0).map_err(backend)?;
        Ok(rows.into_iter().next().map(DbMatchBlob::into_blob))
    }

    /// Delete the blob stored under `key` (no-op if absent)
    #[instrument(skip(self))]
    pub async fn match_delete(&self, key: &str) -> StorageResult<()> {
        let key_owned = key.to_string();

        self.db
            .query("DELETE FROM matches WHERE key = $key")
            .bind(("key", key_owned))
            .await
            .map_err(backend)?
            .check()
            .map_err(backend)?;
        Ok(())
    }

    /// List every stored match blob
    #[instrument(skip(self))]
    pub async fn match_list(&self) -> StorageResult<Vec<MatchBlob>> {
        let mut result = self
            .db
            .query("SELECT * FROM matches")
            .await
            .map_err(backend)?;

        let rows: Vec<DbMatchBlob> = result.take(0).map_err(backend)?;
        Ok(rows.into_iter().map(DbMatchBlob::into_blob).collect())
    }

    // ========== Scorecard Operations ==========

    /// Insert a new scorecard
    #[instrument(skip(self, record), fields(scorecard_id = %record.id))]
    pub async fn scorecard_insert(&self, record: ScorecardRecord) -> StorageResult<ScorecardRecord> {
        if self.scorecard_get(&record.id).await?.is_some() {
            return Err(StorageError::DuplicateScorecard {
                id: record.id.0.clone(),
            });
        }

        self.ensure_share_token_free(&record).await?;

        let created: Option<DbScorecardRecord> = self
            .db
            .create("scorecards")
            .content(DbScorecardRecord::from_record(record))
            .await
            .map_err(backend)?;

        created
            .map(DbScorecardRecord::into_record)
            .ok_or_else(|| StorageError::Backend("failed to create scorecard record".to_string()))
    }

    /// Get a scorecard by id
    #[instrument(skip(self), fields(scorecard_id = %id))]
    pub async fn scorecard_get(&self, id: &ScorecardId) -> StorageResult<Option<ScorecardRecord>> {
        let id_owned = id.0.clone();

        let mut result = self
            .db
            .query("SELECT * FROM scorecards WHERE scorecard_id = $id")
            .bind(("id", id_owned))
            .await
            .map_err(backend)?;

        let rows: Vec<DbScorecardRecord> = result.take(0).map_err(backend)?;
        Ok(rows.into_iter().next().map(DbScorecardRecord::into_record))
    }

    /// Get the scorecard carrying `token`
    #[instrument(skip(self, token))]
    pub async fn scorecard_by_share_token(
        &self,
        token: &str,
    ) -> StorageResult<Option<ScorecardRecord>> {
        let token_owned = token.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM scorecards WHERE share_token = $token LIMIT 1")
            .bind(("token", token_owned))
            .await
            .map_err(backend)?;

        let rows: Vec<DbScorecardRecord> = result.take(0).map_err(backend)?;
        Ok(rows.into_iter().next().map(DbScorecardRecord::into_record))
    }

    /// All scorecards created by `owner`, newest first
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn scorecard_list_by_owner(
        &self,
        owner: &UserId,
    ) -> StorageResult<Vec<ScorecardRecord>> {
        let owner_owned = owner.0.clone();

        let mut result = self
            .db
            .query("SELECT * FROM scorecards WHERE created_by = $owner ORDER BY created_at DESC")
            .bind(("owner", owner_owned))
            .await
            .map_err(backend)?;

        let rows: Vec<DbScorecardRecord> = result.take(0).map_err(backend)?;
        Ok(rows
            .into_iter()
            .map(DbScorecardRecord::into_record)
            .collect())
    }

    /// Overwrite a stored scorecard
    #[instrument(skip(self, record), fields(scorecard_id = %record.id))]
    pub async fn scorecard_replace(
        &self,
        record: ScorecardRecord,
    ) -> StorageResult<ScorecardRecord> {
        self.ensure_share_token_free(&record).await?;
        let id_owned = record.id.0.clone();
        let content = DbScorecardRecord::from_record(record);

        let mut result = self
            .db
            .query("UPDATE scorecards CONTENT $record WHERE scorecard_id = $id RETURN AFTER")
            .bind(("record", content))
            .bind(("id", id_owned.clone()))
            .await
            .map_err(backend)?;

        let updated: Vec<DbScorecardRecord> = result.take(0).map_err(backend)?;
        updated
            .into_iter()
            .next()
            .map(DbScorecardRecord::into_record)
            .ok_or(StorageError::ScorecardNotFound { id: id_owned })
    }

    async fn ensure_share_token_free(&self, record: &ScorecardRecord) -> StorageResult<()> {
        let Some(token) = record.share_token.as_deref() else {
            return Ok(());
        };
        match self.scorecard_by_share_token(token).await? {
            Some(holder) if holder.id != record.id => Err(StorageError::DuplicateShareToken {
                holder: holder.id.0,
            }),
            _ => Ok(()),
        }
    }

    /// Delete a scorecard, reporting whether it existed
    #[instrument(skip(self), fields(scorecard_id = %id))]
    pub async fn scorecard_delete(&self, id: &ScorecardId) -> StorageResult<bool> {
        let id_owned = id.0.clone();

        let mut result = self
            .db
            .query("DELETE FROM scorecards WHERE scorecard_id = $id RETURN BEFORE")
            .bind(("id", id_owned))
            .await
            .map_err(backend)?;

        let deleted: Vec<DbScorecardRecord> = result.take(0).map_err(backend)?;
        Ok(!deleted.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_surreal_connection_and_schema_creation() {
        let handle = SurrealHandle::setup_db().await;
        assert!(handle.is_ok(), "Failed to connect: {:?}", handle.err());
    }

    #[tokio::test]
    async fn test_match_blob_upsert_and_delete() {
        let handle = SurrealHandle::setup_db().await.unwrap();
        let now = Utc::now();

        handle
            .match_put(MatchBlob::new("m-1", r#"{"v":1}"#, now))
            .await
            .unwrap();
        handle
            .match_put(MatchBlob::new("m-1", r#"{"v":2}"#, now))
            .await
            .unwrap();

        let all = handle.match_list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].payload, r#"{"v":2}"#);

        handle.match_delete("m-1").await.unwrap();
        assert!(handle.match_get("m-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scorecard_delete_existing_and_missing() {
        let handle = SurrealHandle::setup_db().await.unwrap();
        let now = Utc::now();
        let record = ScorecardRecord {
            id: ScorecardId("sc-1".to_string()),
            title: "Sunday league".to_string(),
            description: None,
            kind: ScorecardKind::Football,
            fields: vec![],
            values: vec![],
            created_by: UserId::new("u-1"),
            is_public: false,
            share_token: None,
            created_at: now,
            updated_at: now,
        };
        handle.scorecard_insert(record).await.unwrap();

        let id = ScorecardId("sc-1".to_string());
        assert!(handle.scorecard_delete(&id).await.unwrap());
        assert!(!handle.scorecard_delete(&id).await.unwrap());
    }
}

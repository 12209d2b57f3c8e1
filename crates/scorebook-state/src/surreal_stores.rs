use std::sync::Arc;

use async_trait::async_trait;

use crate::storage_traits::{
    MatchBlob, MatchStore, ScorecardId, ScorecardRecord, ScorecardStore, StorageResult, UserId,
};
use crate::SurrealHandle;

/// SurrealDB-backed implementation of the MatchStore trait.
#[derive(Clone)]
pub struct SurrealMatchStore {
    handle: Arc<SurrealHandle>,
}

impl SurrealMatchStore {
    pub fn new(handle: Arc<SurrealHandle>) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl MatchStore for SurrealMatchStore {
    async fn put(&self, blob: MatchBlob) -> StorageResult<()> {
        self.handle.match_put(blob).await
    }

    async fn get(&self, key: &str) -> StorageResult<Option<MatchBlob>> {
        self.handle.match_get(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.handle.match_delete(key).await
    }

    async fn list(&self) -> StorageResult<Vec<MatchBlob>> {
        self.handle.match_list().await
    }
}

/// SurrealDB-backed implementation of the ScorecardStore trait.
#[derive(Clone)]
pub struct SurrealScorecardStore {
    handle: Arc<SurrealHandle>,
}

impl SurrealScorecardStore {
    pub fn new(handle: Arc<SurrealHandle>) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl ScorecardStore for SurrealScorecardStore {
    async fn insert(&self, record: ScorecardRecord) -> StorageResult<ScorecardRecord> {
        self.handle.scorecard_insert(record).await
    }

    async fn get(&self, id: &ScorecardId) -> StorageResult<Option<ScorecardRecord>> {
        self.handle.scorecard_get(id).await
    }

    async fn get_by_share_token(&self, token: &str) -> StorageResult<Option<ScorecardRecord>> {
        self.handle.scorecard_by_share_token(token).await
    }

    async fn list_by_owner(&self, owner: &UserId) -> StorageResult<Vec<ScorecardRecord>> {
        self.handle.scorecard_list_by_owner(owner).await
    }

    async fn replace(&self, record: ScorecardRecord) -> StorageResult<ScorecardRecord> {
        self.handle.scorecard_replace(record).await
    }

    async fn delete(&self, id: &ScorecardId) -> StorageResult<bool> {
        self.handle.scorecard_delete(id).await
    }
}

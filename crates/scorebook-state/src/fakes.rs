//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryMatchStore` and `MemoryScorecardStore` that satisfy the
//! trait contracts without any external dependencies. `MemoryMatchStore` can
//! also be told to fail writes, to exercise the callers' error paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemoryMatchStore
// ---------------------------------------------------------------------------

/// In-memory match store backed by a `HashMap<key, MatchBlob>`.
#[derive(Debug, Default)]
pub struct MemoryMatchStore {
    blobs: Mutex<HashMap<String, MatchBlob>>,
    fail_writes: AtomicBool,
}

impl MemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` fail with a backend error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MatchStore for MemoryMatchStore {
    async fn put(&self, blob: MatchBlob) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("store unavailable".to_string()));
        }
        let mut blobs = self.blobs.lock().unwrap();
        blobs.insert(blob.key.clone(), blob);
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Option<MatchBlob>> {
        let blobs = self.blobs.lock().unwrap();
        Ok(blobs.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut blobs = self.blobs.lock().unwrap();
        blobs.remove(key);
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<MatchBlob>> {
        let blobs = self.blobs.lock().unwrap();
        Ok(blobs.values().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryScorecardStore
// ---------------------------------------------------------------------------

/// In-memory scorecard store backed by a `HashMap<ScorecardId, ScorecardRecord>`.
#[derive(Debug, Default)]
pub struct MemoryScorecardStore {
    records: Mutex<HashMap<String, ScorecardRecord>>,
}

impl MemoryScorecardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_share_token(
    records: &HashMap<String, ScorecardRecord>,
    record: &ScorecardRecord,
) -> StorageResult<()> {
    let Some(token) = record.share_token.as_deref() else {
        return Ok(());
    };
    match records
        .values()
        .find(|r| r.id != record.id && r.share_token.as_deref() == Some(token))
    {
        Some(holder) => Err(StorageError::DuplicateShareToken {
            holder: holder.id.0.clone(),
        }),
        None => Ok(()),
    }
}

#[async_trait]
impl ScorecardStore for MemoryScorecardStore {
    async fn insert(&self, record: ScorecardRecord) -> StorageResult<ScorecardRecord> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.id.0) {
            return Err(StorageError::DuplicateScorecard {
                id: record.id.0.clone(),
            });
        }
        check_share_token(&records, &record)?;
        records.insert(record.id.0.clone(), record.clone());
        Ok(record)
    }

    async fn get(&self, id: &ScorecardId) -> StorageResult<Option<ScorecardRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.get(&id.0).cloned())
    }

    async fn get_by_share_token(&self, token: &str) -> StorageResult<Option<ScorecardRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .values()
            .find(|r| r.share_token.as_deref() == Some(token))
            .cloned())
    }

    async fn list_by_owner(&self, owner: &UserId) -> StorageResult<Vec<ScorecardRecord>> {
        let records = self.records.lock().unwrap();
        let mut owned: Vec<ScorecardRecord> = records
            .values()
            .filter(|r| r.created_by == *owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn replace(&self, record: ScorecardRecord) -> StorageResult<ScorecardRecord> {
        let mut records = self.records.lock().unwrap();
        check_share_token(&records, &record)?;
        let slot = records
            .get_mut(&record.id.0)
            .ok_or_else(|| StorageError::ScorecardNotFound {
                id: record.id.0.clone(),
            })?;
        *slot = record.clone();
        Ok(record)
    }

    async fn delete(&self, id: &ScorecardId) -> StorageResult<bool> {
        let mut records = self.records.lock().unwrap();
        Ok(records.remove(&id.0).is_some())
    }
}

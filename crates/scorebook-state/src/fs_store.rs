//! Filesystem-backed match store.
//!
//! One JSON file per match. File names are derived from the SHA-256 of the
//! match key, so any key is path-safe:
//!
//! `<root>/matches/match_<sha256(key) hex>.json`

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, instrument, warn};

use crate::storage_traits::{MatchBlob, MatchStore, StorageResult};

const FILE_PREFIX: &str = "match_";
const FILE_SUFFIX: &str = ".json";

/// Match store writing each blob to its own file under `<root>/matches/`.
#[derive(Debug, Clone)]
pub struct FsMatchStore {
    matches_dir: PathBuf,
}

impl FsMatchStore {
    /// Create a store rooted at `root`. Creates `root/matches/` if needed.
    pub fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let matches_dir = root.as_ref().join("matches");
        fs::create_dir_all(&matches_dir)?;
        Ok(Self { matches_dir })
    }

    /// Directory holding the match files.
    pub fn matches_dir(&self) -> &Path {
        &self.matches_dir
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(key.as_bytes()));
        self.matches_dir
            .join(format!("{FILE_PREFIX}{digest}{FILE_SUFFIX}"))
    }

    fn is_match_file(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(FILE_PREFIX) && n.ends_with(FILE_SUFFIX))
            .unwrap_or(false)
    }

    /// Read a blob file; an envelope that fails to parse is removed.
    fn read_blob(path: &Path) -> StorageResult<Option<MatchBlob>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice::<MatchBlob>(&bytes) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "discarding unreadable match file");
                fs::remove_file(path)?;
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl MatchStore for FsMatchStore {
    #[instrument(skip(self, blob), fields(key = %blob.key))]
    async fn put(&self, blob: MatchBlob) -> StorageResult<()> {
        let path = self.blob_path(&blob.key);
        let bytes = serde_json::to_vec(&blob)?;

        // Atomic write: temp file in the same directory, then rename over the target.
        let mut tmp = NamedTempFile::new_in(&self.matches_dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(&path).map_err(|e| e.error)?;

        debug!(path = %path.display(), "match blob written");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> StorageResult<Option<MatchBlob>> {
        Self::read_blob(&self.blob_path(key))
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        match fs::remove_file(self.blob_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn list(&self) -> StorageResult<Vec<MatchBlob>> {
        let mut blobs = Vec::new();
        for entry in fs::read_dir(&self.matches_dir)? {
            let path = entry?.path();
            if !Self::is_match_file(&path) {
                continue;
            }
            if let Some(blob) = Self::read_blob(&path)? {
                blobs.push(blob);
            }
        }
        Ok(blobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_store() -> (tempfile::TempDir, FsMatchStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsMatchStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn put_then_get() {
        let (_dir, store) = make_store();
        let blob = MatchBlob::new("m-1", r#"{"id":"m-1"}"#, Utc::now());
        store.put(blob.clone()).await.unwrap();
        assert_eq!(store.get("m-1").await.unwrap(), Some(blob));
    }

    #[tokio::test]
    async fn put_overwrites_same_key() {
        let (_dir, store) = make_store();
        let now = Utc::now();
        store.put(MatchBlob::new("m-1", "first", now)).await.unwrap();
        store.put(MatchBlob::new("m-1", "second", now)).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].payload, "second");
    }

    #[tokio::test]
    async fn keys_with_path_separators_stay_inside_root() {
        let (_dir, store) = make_store();
        store
            .put(MatchBlob::new("../../etc/passwd", "{}", Utc::now()))
            .await
            .unwrap();
        let entries: Vec<_> = fs::read_dir(store.matches_dir()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert!(store.get("../../etc/passwd").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn missing_key_is_none_and_delete_is_noop() {
        let (_dir, store) = make_store();
        assert!(store.get("nope").await.unwrap().is_none());
        store.delete("nope").await.unwrap();
    }

    #[tokio::test]
    async fn unreadable_file_is_discarded_on_list() {
        let (_dir, store) = make_store();
        store
            .put(MatchBlob::new("good", "{}", Utc::now()))
            .await
            .unwrap();
        let junk = store.matches_dir().join("match_deadbeef.json");
        fs::write(&junk, b"not json at all").unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].key, "good");
        assert!(!junk.exists());
    }

    #[tokio::test]
    async fn foreign_files_are_ignored() {
        let (_dir, store) = make_store();
        let other = store.matches_dir().join("README.txt");
        fs::write(&other, b"hello").unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(other.exists());
    }
}

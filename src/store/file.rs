//! # File-backed registration store.
//!
//! Persists the [`RegistrationRecord`] as a single JSON document in a fixed
//! file. Durability across process restarts is the whole point: the record
//! written by a foreground registration must still be readable when a
//! background wake cold-starts the dispatcher.
//!
//! ## Crash safety
//! Writes go to a sibling `<path>.tmp` file which is then renamed over the
//! destination. Rename is atomic on POSIX filesystems, so `load` observes
//! either the old record or the new one, never a half-written pair. A
//! leftover `.tmp` from a crashed write is simply ignored.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::StoreError;
use crate::store::{RegistrationRecord, RegistrationStore};

/// JSON-document store with atomic replace-on-write.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store persisting to `path`.
    ///
    /// The parent directory must exist; the file itself is created on the
    /// first `save`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut os = self.path.as_os_str().to_owned();
        os.push(".tmp");
        PathBuf::from(os)
    }
}

#[async_trait]
impl RegistrationStore for JsonFileStore {
    async fn load(&self) -> Result<Option<RegistrationRecord>, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };
        let record = serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            detail: e.to_string(),
        })?;
        Ok(Some(record))
    }

    async fn save(&self, record: RegistrationRecord) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&record).map_err(|e| StoreError::Corrupt {
            detail: e.to_string(),
        })?;
        let tmp = self.tmp_path();
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("headless.json"))
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let rec = RegistrationRecord::new(100, 200);
        store.save(rec).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(rec));
    }

    #[tokio::test]
    async fn test_load_absent_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_interrupted_write_never_exposes_partial_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let rec = RegistrationRecord::new(100, 200);
        store.save(rec).await.unwrap();

        // Simulate a crash mid-write: garbage sits in the tmp file, the
        // rename never happened.
        fs::write(store.tmp_path(), b"{\"registrationCallbackId\":9")
            .await
            .unwrap();

        assert_eq!(store.load().await.unwrap(), Some(rec));
    }

    #[tokio::test]
    async fn test_corrupt_file_reports_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), b"not json").await.unwrap();

        let err = store.load().await.unwrap_err();
        assert_eq!(err.as_label(), "store_corrupt");
    }

    #[tokio::test]
    async fn test_save_replaces_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(RegistrationRecord::new(1, 2)).await.unwrap();
        store.save(RegistrationRecord::new(3, 4)).await.unwrap();
        assert_eq!(
            store.load().await.unwrap(),
            Some(RegistrationRecord::new(3, 4))
        );
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.clear().await.unwrap();
        store.save(RegistrationRecord::new(1, 2)).await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}

//! Versioned key/value blob storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use podship_core::ExpectedVersion;

/// A stored blob and the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedBlob {
    pub bytes: Vec<u8>,
    /// Starts at 1 on first write, +1 on every write. A missing key is version 0.
    pub version: u64,
}

/// Blob store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("optimistic concurrency check failed for '{key}' (expected {expected:?}, found {actual})")]
    Conflict {
        key: String,
        expected: ExpectedVersion,
        actual: u64,
    },

    #[error("encoding failed: {0}")]
    Codec(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Key/value blob store with compare-and-swap writes.
///
/// Implementations must:
/// - report a missing key as `Ok(None)` (version 0)
/// - reject `set_blob` with `StoreError::Conflict` when `expected` does not
///   match the current version, without writing anything
/// - make the check and the write a single atomic step per key
pub trait BlobStore: Send + Sync {
    fn get_blob(&self, key: &str) -> Result<Option<VersionedBlob>, StoreError>;

    /// Write `bytes` under `key`; returns the new version.
    fn set_blob(&self, key: &str, bytes: &[u8], expected: ExpectedVersion) -> Result<u64, StoreError>;
}

impl<S> BlobStore for Arc<S>
where
    S: BlobStore + ?Sized,
{
    fn get_blob(&self, key: &str) -> Result<Option<VersionedBlob>, StoreError> {
        (**self).get_blob(key)
    }

    fn set_blob(&self, key: &str, bytes: &[u8], expected: ExpectedVersion) -> Result<u64, StoreError> {
        (**self).set_blob(key, bytes, expected)
    }
}

/// In-memory blob store.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, VersionedBlob>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn get_blob(&self, key: &str) -> Result<Option<VersionedBlob>, StoreError> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(blobs.get(key).cloned())
    }

    fn set_blob(&self, key: &str, bytes: &[u8], expected: ExpectedVersion) -> Result<u64, StoreError> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let current = blobs.get(key).map(|b| b.version).unwrap_or(0);
        if !expected.matches(current) {
            return Err(StoreError::Conflict {
                key: key.to_string(),
                expected,
                actual: current,
            });
        }

        let version = current + 1;
        blobs.insert(
            key.to_string(),
            VersionedBlob {
                bytes: bytes.to_vec(),
                version,
            },
        );
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_as_none() {
        let store = InMemoryBlobStore::new();
        assert!(store.get_blob("nope").unwrap().is_none());
    }

    #[test]
    fn versions_increase_per_write() {
        let store = InMemoryBlobStore::new();
        assert_eq!(store.set_blob("k", b"one", ExpectedVersion::Exact(0)).unwrap(), 1);
        assert_eq!(store.set_blob("k", b"two", ExpectedVersion::Exact(1)).unwrap(), 2);
        let blob = store.get_blob("k").unwrap().unwrap();
        assert_eq!(blob.bytes, b"two");
        assert_eq!(blob.version, 2);
    }

    #[test]
    fn stale_write_is_rejected_and_not_applied() {
        let store = InMemoryBlobStore::new();
        store.set_blob("k", b"one", ExpectedVersion::Exact(0)).unwrap();

        let err = store.set_blob("k", b"stale", ExpectedVersion::Exact(0)).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.get_blob("k").unwrap().unwrap().bytes, b"one");
    }

    #[test]
    fn any_version_always_writes() {
        let store = InMemoryBlobStore::new();
        store.set_blob("k", b"one", ExpectedVersion::Exact(0)).unwrap();
        assert_eq!(store.set_blob("k", b"two", ExpectedVersion::Any).unwrap(), 2);
    }
}

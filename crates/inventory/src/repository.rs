//! Typed access to the inventory blob with optimistic retries.

use tracing::{debug, warn};

use podship_core::{ExpectedVersion, Versioned};

use crate::record::InventoryRecord;
use crate::store::{BlobStore, StoreError};

/// Fixed key of the process-wide inventory blob.
pub const INVENTORY_BLOB_KEY: &str = "fulfillment-inventory";

const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Loads, saves and atomically updates the inventory record.
#[derive(Debug, Clone)]
pub struct InventoryRepository<S> {
    store: S,
    key: String,
    max_attempts: u32,
}

impl<S: BlobStore> InventoryRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            key: INVENTORY_BLOB_KEY.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Bound on read-modify-write attempts when writers collide (minimum 1).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the record and its version.
    ///
    /// A blob that cannot be decoded is treated as an empty record at the
    /// stored version, so the next save replaces it.
    pub fn load(&self) -> Result<Versioned<InventoryRecord>, StoreError> {
        let Some(blob) = self.store.get_blob(&self.key)? else {
            return Ok(Versioned::unsaved(InventoryRecord::new()));
        };

        match serde_json::from_slice::<InventoryRecord>(&blob.bytes) {
            Ok(record) => {
                debug!(key = %self.key, version = blob.version, entries = record.len(), "loaded inventory");
                Ok(Versioned::new(record, blob.version))
            }
            Err(e) => {
                warn!(key = %self.key, version = blob.version, error = %e, "inventory blob unreadable; treating as empty");
                Ok(Versioned::new(InventoryRecord::new(), blob.version))
            }
        }
    }

    /// Write the record if the stored version still matches.
    pub fn save(&self, record: &InventoryRecord, expected: ExpectedVersion) -> Result<u64, StoreError> {
        let bytes = serde_json::to_vec(record).map_err(|e| StoreError::Codec(e.to_string()))?;
        let version = self.store.set_blob(&self.key, &bytes, expected)?;
        debug!(key = %self.key, version, entries = record.len(), "saved inventory");
        Ok(version)
    }

    /// Read-modify-write with compare-and-swap.
    ///
    /// `mutate` may run several times (once per attempt) and must therefore
    /// be a pure function of the record it is given. Nothing is written when
    /// `mutate` leaves the record unchanged.
    pub fn update<R>(&self, mut mutate: impl FnMut(&mut InventoryRecord) -> R) -> Result<R, StoreError> {
        let mut attempt = 1;
        loop {
            let current = self.load()?;
            let mut next = current.value.clone();
            let result = mutate(&mut next);

            if next == current.value {
                return Ok(result);
            }

            match self.save(&next, current.expected()) {
                Ok(_) => return Ok(result),
                Err(e) if e.is_conflict() && attempt < self.max_attempts => {
                    warn!(key = %self.key, attempt, "inventory write conflicted; retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryBlobStore, VersionedBlob};
    use chrono::{DateTime, Utc};
    use podship_core::ProductId;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn pid(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn missing_blob_loads_as_unsaved_empty_record() {
        let repo = InventoryRepository::new(InMemoryBlobStore::new());
        let loaded = repo.load().unwrap();
        assert!(loaded.value.is_empty());
        assert_eq!(loaded.version, 0);
    }

    #[test]
    fn garbage_blob_loads_as_empty_and_is_overwritten() {
        let store = Arc::new(InMemoryBlobStore::new());
        store
            .set_blob(INVENTORY_BLOB_KEY, b"a:1:{not json", ExpectedVersion::Any)
            .unwrap();
        let repo = InventoryRepository::new(store.clone());

        let loaded = repo.load().unwrap();
        assert!(loaded.value.is_empty());
        assert_eq!(loaded.version, 1);

        repo.update(|r| r.touch([&pid("A")], now())).unwrap();
        assert!(repo.load().unwrap().value.contains(&pid("A")));
    }

    #[test]
    fn unchanged_update_does_not_write() {
        let store = Arc::new(InMemoryBlobStore::new());
        let repo = InventoryRepository::new(store.clone());
        repo.update(|_| ()).unwrap();
        assert!(store.get_blob(INVENTORY_BLOB_KEY).unwrap().is_none());
    }

    /// A store that lets another writer sneak in before the first `n` writes.
    struct RacingStore {
        inner: InMemoryBlobStore,
        interruptions: AtomicU32,
    }

    impl BlobStore for RacingStore {
        fn get_blob(&self, key: &str) -> Result<Option<VersionedBlob>, StoreError> {
            self.inner.get_blob(key)
        }

        fn set_blob(&self, key: &str, bytes: &[u8], expected: ExpectedVersion) -> Result<u64, StoreError> {
            if self.interruptions.load(Ordering::SeqCst) > 0 {
                self.interruptions.fetch_sub(1, Ordering::SeqCst);
                let rival = InventoryRecord::new().touched([&pid("RIVAL")], now());
                let rival_bytes = serde_json::to_vec(&rival).unwrap();
                self.inner.set_blob(key, &rival_bytes, ExpectedVersion::Any)?;
            }
            self.inner.set_blob(key, bytes, expected)
        }
    }

    #[test]
    fn concurrent_writer_is_not_lost() {
        let store = RacingStore {
            inner: InMemoryBlobStore::new(),
            interruptions: AtomicU32::new(1),
        };
        let repo = InventoryRepository::new(store);

        repo.update(|r| r.touch([&pid("MINE")], now())).unwrap();

        let record = repo.load().unwrap().value;
        assert!(record.contains(&pid("MINE")));
        assert!(record.contains(&pid("RIVAL")));
    }

    #[test]
    fn retries_are_bounded() {
        let store = RacingStore {
            inner: InMemoryBlobStore::new(),
            interruptions: AtomicU32::new(10),
        };
        let repo = InventoryRepository::new(store).with_max_attempts(3);

        let err = repo.update(|r| r.touch([&pid("MINE")], now())).unwrap_err();
        assert!(err.is_conflict());
    }
}

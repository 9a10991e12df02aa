//! File-backed blob store: one JSON envelope per key.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use podship_core::ExpectedVersion;
use podship_inventory::{BlobStore, StoreError, VersionedBlob};

/// Blob payload as written to disk. UTF-8 blobs stay readable for hand edits.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

impl Payload {
    fn from_bytes(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Payload::Text(text.to_string()),
            Err(_) => Payload::Bytes(bytes.to_vec()),
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Text(text) => text.into_bytes(),
            Payload::Bytes(bytes) => bytes,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u64,
    data: Payload,
}

/// Blob store over a directory.
///
/// Writes go to a temp file in the same directory and are renamed into
/// place. The version check and the rename happen under one lock, so CAS
/// holds for every writer sharing this instance (not across processes).
#[derive(Debug)]
pub struct FileBlobStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl FileBlobStore {
    /// Open (and create if needed) the store directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| backend(&root, e))?;
        Ok(Self {
            root,
            lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", file_stem(key)))
    }

    fn read(&self, path: &Path) -> Result<Option<Envelope>, StoreError> {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(backend(path, e)),
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| StoreError::Codec(format!("{}: {e}", path.display())))
    }
}

/// Keys map to file names: `[A-Za-z0-9_.-]` kept, everything else `%XX`.
fn file_stem(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

fn backend(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Backend(format!("{}: {e}", path.display()))
}

impl BlobStore for FileBlobStore {
    fn get_blob(&self, key: &str) -> Result<Option<VersionedBlob>, StoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        Ok(self.read(&self.path_for(key))?.map(|env| VersionedBlob {
            version: env.version,
            bytes: env.data.into_bytes(),
        }))
    }

    fn set_blob(&self, key: &str, bytes: &[u8], expected: ExpectedVersion) -> Result<u64, StoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let path = self.path_for(key);
        let current = self.read(&path)?.map(|env| env.version).unwrap_or(0);
        if !expected.matches(current) {
            return Err(StoreError::Conflict {
                key: key.to_string(),
                expected,
                actual: current,
            });
        }

        let version = current + 1;
        let envelope = Envelope {
            version,
            data: Payload::from_bytes(bytes),
        };
        let encoded = serde_json::to_vec_pretty(&envelope).map_err(|e| StoreError::Codec(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(&self.root).map_err(|e| backend(&self.root, e))?;
        tmp.write_all(&encoded).map_err(|e| backend(tmp.path(), e))?;
        tmp.persist(&path).map_err(|e| backend(&path, e.error))?;

        tracing::debug!(key, version, "blob written");
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileBlobStore) {
        let dir = TempDir::new().unwrap();
        let store = FileBlobStore::open(dir.path().join("blobs")).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_key_is_none() {
        let (_dir, store) = store();
        assert!(store.get_blob("fulfillment-inventory").unwrap().is_none());
    }

    #[test]
    fn versions_increase_and_cas_is_enforced() {
        let (_dir, store) = store();
        let key = "fulfillment-shipped:42";

        assert_eq!(store.set_blob(key, b"A,B", ExpectedVersion::Exact(0)).unwrap(), 1);
        assert_eq!(store.set_blob(key, b"A,B,C", ExpectedVersion::Exact(1)).unwrap(), 2);

        let err = store.set_blob(key, b"X", ExpectedVersion::Exact(1)).unwrap_err();
        assert!(err.is_conflict());

        let blob = store.get_blob(key).unwrap().unwrap();
        assert_eq!(blob.version, 2);
        assert_eq!(blob.bytes, b"A,B,C");

        assert_eq!(store.set_blob(key, b"D", ExpectedVersion::Any).unwrap(), 3);
    }

    #[test]
    fn blobs_survive_reopening() {
        let (dir, store) = store();
        store.set_blob("k", b"{\"PX01\":1}", ExpectedVersion::Any).unwrap();
        drop(store);

        let reopened = FileBlobStore::open(dir.path().join("blobs")).unwrap();
        assert_eq!(reopened.get_blob("k").unwrap().unwrap().bytes, b"{\"PX01\":1}");
    }

    #[test]
    fn keys_are_escaped_into_file_names() {
        assert_eq!(file_stem("fulfillment-shipped:42"), "fulfillment-shipped%3A42");
        assert_eq!(file_stem("../etc"), "..%2Fetc");

        let (_dir, store) = store();
        store.set_blob("a/b", b"x", ExpectedVersion::Any).unwrap();
        assert!(store.root().join("a%2Fb.json").exists());
    }

    #[test]
    fn binary_payload_round_trips() {
        let (_dir, store) = store();
        let bytes = [0xff, 0x00, 0x80];
        store.set_blob("bin", &bytes, ExpectedVersion::Any).unwrap();
        assert_eq!(store.get_blob("bin").unwrap().unwrap().bytes, bytes);
    }

    #[test]
    fn corrupt_file_is_a_codec_error() {
        let (_dir, store) = store();
        fs::write(store.root().join("bad.json"), "not json").unwrap();
        assert!(matches!(store.get_blob("bad"), Err(StoreError::Codec(_))));
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Raw key-value stores.
//!
//! Values are opaque JSON text. Stores never interpret them; shape checks
//! belong to the typed layer in [`crate::db::LocalDb`].

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default storage budget, matching a browser origin's local storage.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Errors from raw store writes.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Quota exceeded writing {key}: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    #[error("I/O error: {0}")]
    Io(String),
}

/// Synchronous key-value storage scoped to one installation.
pub trait KeyValueStore: Send {
    /// Read the raw value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Missing keys are not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Size an entry counts against the quota.
fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// In-memory store, used for tests and ephemeral sessions.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_quota(DEFAULT_QUOTA_BYTES)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota,
        }
    }

    fn used_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| entry_size(k, v))
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let needed = self.used_excluding(key) + entry_size(key, value);
        if needed > self.quota {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                needed,
                quota: self.quota,
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File-backed store: one `<key>.json` file per key in a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota: usize,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open<P: AsRef<Path>>(dir: P, quota: usize) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| StoreError::Io(e.to_string()))?;
        tracing::debug!(dir = %dir.display(), quota, "Opened file store");
        Ok(Self { dir, quota })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }

    /// Bytes used by every entry except `key`.
    fn used_excluding(&self, key: &str) -> Result<usize, StoreError> {
        let skip = self.path_for(key);
        let mut used = 0;
        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::Io(e.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Io(e.to_string()))?;
            let path = entry.path();
            if path == skip || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let file_key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| urlencoding::decode(s).map(|k| k.len()).unwrap_or(s.len()))
                .unwrap_or(0);
            let len = entry
                .metadata()
                .map_err(|e| StoreError::Io(e.to_string()))?
                .len() as usize;
            used += file_key + len;
        }
        Ok(used)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read stored value");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let needed = self.used_excluding(key)? + entry_size(key, value);
        if needed > self.quota {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                needed,
                quota: self.quota,
            });
        }

        // Write to a sibling file and rename so readers never see a torn value
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| StoreError::Io(e.to_string()))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_set_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k"), None);

        store.set("k", "\"v\"").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("\"v\""));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_memory_store_quota() {
        let mut store = MemoryStore::with_quota(20);
        store.set("a", "0123456789").unwrap();

        let err = store.set("b", "0123456789").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
        assert_eq!(store.get("b"), None);

        // Replacing an entry only counts the new value
        store.set("a", "01234567890123456").unwrap();
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path(), DEFAULT_QUOTA_BYTES).unwrap();
        store.set("eduVisual_profile", "{\"fullName\":\"An\"}").unwrap();

        let reopened = FileStore::open(dir.path(), DEFAULT_QUOTA_BYTES).unwrap();
        assert_eq!(
            reopened.get("eduVisual_profile").as_deref(),
            Some("{\"fullName\":\"An\"}")
        );
        assert_eq!(reopened.get("missing"), None);
    }

    #[test]
    fn test_file_store_quota() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path(), 64).unwrap();
        store.set("small", "[]").unwrap();

        let big = "x".repeat(100);
        let err = store.set("big", &big).unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { ref key, .. } if key == "big"));
        assert_eq!(store.get("big"), None);
        assert_eq!(store.get("small").as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path(), DEFAULT_QUOTA_BYTES).unwrap();
        store.remove("nothing").unwrap();
    }
}

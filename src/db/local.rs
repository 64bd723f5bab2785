// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed access to the persisted records.
//!
//! Provides load/save for:
//! - Profile (singleton)
//! - Credentials (ordered API keys)
//! - Saved prompts (collection)
//! - Entitlement flag
//!
//! Loads never fail: a missing or malformed record falls back to its
//! default, and malformed saved-prompt entries are skipped individually.

use crate::config::Config;
use crate::db::keys;
use crate::db::store::{FileStore, KeyValueStore, MemoryStore, StoreError};
use crate::error::AppError;
use crate::models::{CredentialSet, Profile, SavedPrompt};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::{Arc, Mutex};

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::QuotaExceeded { key, .. } => AppError::StorageQuotaExceeded { key },
            StoreError::Io(msg) => AppError::Storage(msg),
        }
    }
}

/// Value of a write-through operation plus any non-fatal persistence failure.
///
/// When `warning` is set the in-memory change stands but did not reach
/// storage.
#[derive(Debug)]
pub struct Stored<T> {
    pub value: T,
    pub warning: Option<AppError>,
}

impl<T> Stored<T> {
    /// Pair `value` with the result of flushing it.
    pub fn new(value: T, flushed: Result<(), AppError>) -> Self {
        Self {
            value,
            warning: flushed.err(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }
}

/// Handle to the local store. Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct LocalDb {
    store: Arc<Mutex<Box<dyn KeyValueStore>>>,
}

impl LocalDb {
    /// Wrap an existing store.
    pub fn new<S: KeyValueStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(Mutex::new(Box::new(store))),
        }
    }

    /// Open the file-backed store described by the configuration.
    pub fn open(config: &Config) -> Result<Self, AppError> {
        let store = FileStore::open(&config.data_dir, config.storage_quota_bytes)?;
        tracing::info!(dir = %config.data_dir.display(), "Opened local storage");
        Ok(Self::new(store))
    }

    /// Create an in-memory store for testing (nothing survives the process).
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    // ─── Raw Access ──────────────────────────────────────────────

    /// Read the raw stored text for a key.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        match self.store.lock() {
            Ok(store) => store.get(key),
            Err(_) => {
                tracing::error!(key, "Store lock poisoned on read");
                None
            }
        }
    }

    /// Write raw text for a key.
    pub fn set_raw(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| AppError::Storage("Store lock poisoned".to_string()))?;
        store.set(key, value)?;
        Ok(())
    }

    /// Load a record, falling back to its default when missing or malformed.
    fn read<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self.get_raw(key) else {
            return T::default();
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Malformed stored record, using default");
                T::default()
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode {}: {}", key, e)))?;
        self.set_raw(key, &json).inspect_err(|e| {
            tracing::warn!(key, bytes = json.len(), error = %e, "Failed to persist record");
        })
    }

    // ─── Profile ─────────────────────────────────────────────────

    pub fn load_profile(&self) -> Profile {
        self.read(keys::PROFILE)
    }

    pub fn save_profile(&self, profile: &Profile) -> Result<(), AppError> {
        self.write(keys::PROFILE, profile)
    }

    // ─── Credentials ─────────────────────────────────────────────

    pub fn load_credentials(&self) -> CredentialSet {
        self.read(keys::API_KEYS)
    }

    pub fn save_credentials(&self, credentials: &CredentialSet) -> Result<(), AppError> {
        self.write(keys::API_KEYS, credentials)
    }

    // ─── Entitlement ─────────────────────────────────────────────

    /// Stored as JSON `true`; a quoted `"true"` is accepted as well.
    pub fn load_entitlement(&self) -> bool {
        match self.read::<serde_json::Value>(keys::ENTITLEMENT) {
            serde_json::Value::Bool(flag) => flag,
            serde_json::Value::String(s) => s == "true",
            _ => false,
        }
    }

    pub fn save_entitlement(&self, entitled: bool) -> Result<(), AppError> {
        self.write(keys::ENTITLEMENT, &entitled)
    }

    // ─── Saved Prompts ───────────────────────────────────────────

    /// Load saved prompts in storage order, skipping malformed entries.
    pub fn load_saved_prompts(&self) -> Vec<SavedPrompt> {
        let entries: Vec<serde_json::Value> = self.read(keys::SAVED_PROMPTS);
        let total = entries.len();

        let prompts: Vec<SavedPrompt> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();

        if prompts.len() < total {
            tracing::warn!(
                skipped = total - prompts.len(),
                "Skipped malformed saved prompts"
            );
        }
        prompts
    }

    pub fn save_saved_prompts(&self, prompts: &[SavedPrompt]) -> Result<(), AppError> {
        self.write(keys::SAVED_PROMPTS, prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FormDraft, TargetAudience};

    #[test]
    fn test_missing_records_load_defaults() {
        let db = LocalDb::in_memory();
        assert_eq!(db.load_profile(), Profile::default());
        assert!(db.load_credentials().is_empty());
        assert!(!db.load_entitlement());
        assert!(db.load_saved_prompts().is_empty());
    }

    #[test]
    fn test_malformed_records_load_defaults() {
        let db = LocalDb::in_memory();
        db.set_raw(keys::PROFILE, "{not json").unwrap();
        db.set_raw(keys::API_KEYS, "\"just a string\"").unwrap();
        db.set_raw(keys::ENTITLEMENT, "1").unwrap();
        db.set_raw(keys::SAVED_PROMPTS, "{}").unwrap();

        assert_eq!(db.load_profile(), Profile::default());
        assert!(db.load_credentials().is_empty());
        assert!(!db.load_entitlement());
        assert!(db.load_saved_prompts().is_empty());
    }

    #[test]
    fn test_profile_round_trip() {
        let db = LocalDb::in_memory();
        let profile = Profile {
            display_name: "Minh".to_string(),
            grade_level: Some(TargetAudience::Secondary),
            ..Profile::default()
        };
        db.save_profile(&profile).unwrap();
        assert_eq!(db.load_profile(), profile);
    }

    #[test]
    fn test_entitlement_accepts_quoted_true() {
        let db = LocalDb::in_memory();
        db.set_raw(keys::ENTITLEMENT, "\"true\"").unwrap();
        assert!(db.load_entitlement());

        db.save_entitlement(true).unwrap();
        assert_eq!(db.get_raw(keys::ENTITLEMENT).as_deref(), Some("true"));
    }

    #[test]
    fn test_malformed_saved_prompt_entries_skipped() {
        let db = LocalDb::in_memory();
        db.set_raw(
            keys::SAVED_PROMPTS,
            r#"[
                {"id":"1","title":"Plants","createdAt":1,"updatedAt":2,"data":{"topic":"Plants"}},
                {"id":"2","title":"Broken"},
                42
            ]"#,
        )
        .unwrap();

        let prompts = db.load_saved_prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].data.topic, "Plants");
        assert_eq!(prompts[0].data.image_quality, FormDraft::default().image_quality);
    }

    #[test]
    fn test_quota_error_maps_to_app_error() {
        let db = LocalDb::new(MemoryStore::with_quota(16));
        let profile = Profile::default();
        let err = db.save_profile(&profile).unwrap_err();
        assert!(matches!(err, AppError::StorageQuotaExceeded { ref key } if key == keys::PROFILE));
    }
}

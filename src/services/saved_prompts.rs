// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Saved-prompt repository: named, timestamped draft snapshots.
//!
//! Every mutation is written through to local storage before returning.

use crate::db::{LocalDb, Stored};
use crate::error::AppError;
use crate::models::{Field, FormDraft, SavedPrompt};
use crate::time_utils::now_millis;

/// In-memory view of the saved prompts, backed by local storage.
pub struct SavedPromptRepository {
    db: LocalDb,
    /// Storage order; new records are appended
    prompts: Vec<SavedPrompt>,
    /// Last timestamp handed out, so timestamps strictly increase
    last_timestamp: i64,
}

impl SavedPromptRepository {
    /// Load the collection from storage.
    pub fn load(db: LocalDb) -> Self {
        let prompts = db.load_saved_prompts();
        let last_timestamp = prompts
            .iter()
            .map(|p| p.updated_at.max(p.created_at))
            .max()
            .unwrap_or(0);
        tracing::info!(count = prompts.len(), "Loaded saved prompts");
        Self {
            db,
            prompts,
            last_timestamp,
        }
    }

    /// Next timestamp: the current time, bumped past anything issued before.
    fn next_timestamp(&mut self) -> i64 {
        let ts = now_millis().max(self.last_timestamp + 1);
        self.last_timestamp = ts;
        ts
    }

    fn flush(&self) -> Result<(), AppError> {
        self.db.save_saved_prompts(&self.prompts)
    }

    /// Save `draft`, updating `current_id` in place when it exists.
    ///
    /// Returns the id of the record written. A blank topic is rejected
    /// without touching the collection.
    pub fn save(
        &mut self,
        draft: &FormDraft,
        current_id: Option<&str>,
    ) -> Result<Stored<String>, AppError> {
        let title = draft.topic.trim();
        if title.is_empty() {
            return Err(AppError::invalid(
                Field::Topic,
                "Please enter a topic before saving",
            ));
        }
        let title = title.to_string();

        let existing = current_id.and_then(|id| self.prompts.iter().position(|p| p.id == id));

        let id = match existing {
            Some(index) => {
                let now = self.next_timestamp();
                let record = &mut self.prompts[index];
                record.title = title;
                record.updated_at = now;
                record.data = draft.clone();
                tracing::info!(id = %record.id, "Updated saved prompt");
                record.id.clone()
            }
            None => {
                let mut now = self.next_timestamp();
                while self.get(&now.to_string()).is_some() {
                    now = self.next_timestamp();
                }
                let id = now.to_string();
                self.prompts.push(SavedPrompt {
                    id: id.clone(),
                    title,
                    created_at: now,
                    updated_at: now,
                    data: draft.clone(),
                });
                tracing::info!(id = %id, "Created saved prompt");
                id
            }
        };

        Ok(Stored::new(id, self.flush()))
    }

    /// Delete a record by id. Unknown ids are a no-op.
    ///
    /// The value reports whether a record was removed.
    pub fn delete(&mut self, id: &str) -> Stored<bool> {
        let before = self.prompts.len();
        self.prompts.retain(|p| p.id != id);
        if self.prompts.len() == before {
            return Stored::new(false, Ok(()));
        }
        tracing::info!(id, "Deleted saved prompt");
        Stored::new(true, self.flush())
    }

    /// Records whose title contains `filter` (case-insensitive), most
    /// recently updated first. Ties keep storage order.
    pub fn list(&self, filter: &str) -> Vec<&SavedPrompt> {
        let needle = filter.to_lowercase();
        let mut matches: Vec<&SavedPrompt> = self
            .prompts
            .iter()
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .collect();
        matches.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        matches
    }

    /// Copy of the stored draft, ready for editing.
    pub fn load_as_draft(&self, id: &str) -> Result<FormDraft, AppError> {
        self.get(id)
            .map(|p| p.data.clone())
            .ok_or_else(|| AppError::NotFound(format!("Saved prompt {}", id)))
    }

    pub fn get(&self, id: &str) -> Option<&SavedPrompt> {
        self.prompts.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

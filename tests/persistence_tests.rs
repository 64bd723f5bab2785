// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Records survive a restart of the file-backed store.

mod common;

use common::fill_valid_draft;
use edu_visual::config::Config;
use edu_visual::db::{keys, FileStore, KeyValueStore, LocalDb};
use edu_visual::models::{CredentialSet, Feature, Profile, TargetAudience};
use edu_visual::AppState;
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> Config {
    Config {
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    }
}

#[test]
fn test_state_round_trips_through_disk() {
    let dir = TempDir::new().unwrap();

    let saved_id = {
        let mut state = AppState::open(config_in(&dir)).unwrap();
        state.save_profile(Profile {
            display_name: "Mr. Minh".to_string(),
            grade_level: Some(TargetAudience::Preschool),
            main_subject: "Art".to_string(),
            ..Profile::default()
        });
        state.save_credentials(CredentialSet::from_entries(["key-a", "key-b"]));
        fill_valid_draft(&mut state);
        state.toggle_feature(Feature::Charts);
        state.save_current_prompt();
        state.current_prompt_id().unwrap().to_string()
    };

    let mut state = AppState::open(config_in(&dir)).unwrap();
    assert_eq!(state.profile().display_name, "Mr. Minh");
    assert_eq!(state.credentials().as_slice(), ["key-a", "key-b"]);
    // A fresh session starts from the profile, not the last draft
    assert_eq!(state.draft().target_audience, Some(TargetAudience::Preschool));
    assert!(state.draft().topic.is_empty());

    state.select_prompt(&saved_id);
    assert_eq!(state.draft().topic, "Photosynthesis");
    assert!(state.draft().features.contains(&Feature::Charts));
    assert!(state.take_notifications().is_empty());
}

#[test]
fn test_malformed_records_load_as_defaults() {
    let dir = TempDir::new().unwrap();
    let mut store = FileStore::open(dir.path(), usize::MAX).unwrap();
    store.set(keys::PROFILE, "{not json").unwrap();
    store.set(keys::API_KEYS, r#"{"keys":["a"]}"#).unwrap();
    store.set(keys::ENTITLEMENT, "\"true\"").unwrap();
    store
        .set(
            keys::SAVED_PROMPTS,
            r#"[
                {"id":"1","title":"Good","createdAt":1,"updatedAt":2,"data":{"topic":"Good","dimension":"a5"}},
                {"id":2,"title":null},
                {"id":"3","title":"Odd fields","createdAt":1,"updatedAt":1,"data":{"topic":7,"features":["mascot","bogus"]}}
            ]"#,
        )
        .unwrap();

    let state = AppState::with_db(config_in(&dir), LocalDb::new(store));

    assert_eq!(state.profile(), &Profile::default());
    assert!(state.credentials().is_empty());
    assert!(state.is_entitled());

    let prompts = state.list_saved_prompts("");
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0].id, "1");
    assert!(prompts[1].data.topic.is_empty());
    assert_eq!(prompts[1].data.features.len(), 1);
}

#[test]
fn test_file_store_quota_counts_all_keys() {
    let dir = TempDir::new().unwrap();
    let mut store = FileStore::open(dir.path(), 64).unwrap();

    store.set("a", &"x".repeat(40)).unwrap();
    assert!(store.set("b", &"y".repeat(40)).is_err());
    assert_eq!(store.get("b"), None);

    // Overwriting a key only counts its new size
    store.set("a", &"z".repeat(60)).unwrap();
    assert_eq!(store.get("a").unwrap().len(), 60);
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use edu_visual::config::Config;
use edu_visual::db::LocalDb;
use edu_visual::models::{Dimension, FieldUpdate, MaterialType, TargetAudience};
use edu_visual::services::gemini::{
    BackendError, GenerationRequest, GenerationResponse, GenerativeBackend, RequestPart,
};
use edu_visual::services::{GenerationService, KeyRotatingExecutor};
use edu_visual::AppState;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Backend that replays scripted results in order and records every call.
///
/// Once the script runs out every call succeeds with "ok".
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<GenerationResponse, BackendError>>>,
    calls: Mutex<Vec<String>>,
    /// When set, each call waits for a permit before answering
    gate: Option<Arc<Notify>>,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn new(script: Vec<Result<GenerationResponse, BackendError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        })
    }

    /// Backend whose calls block until `gate` is notified.
    pub fn gated(
        script: Vec<Result<GenerationResponse, BackendError>>,
        gate: Arc<Notify>,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            gate: Some(gate),
        })
    }

    /// Credentials used, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate(
        &self,
        credential: &str,
        _request: &GenerationRequest,
    ) -> Result<GenerationResponse, BackendError> {
        self.calls.lock().unwrap().push(credential.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(GenerationResponse::text_only("ok")))
    }
}

#[allow(dead_code)]
pub fn rate_limited() -> Result<GenerationResponse, BackendError> {
    Err(BackendError::RateLimited("Resource has been exhausted".to_string()))
}

#[allow(dead_code)]
pub fn text(text: &str) -> Result<GenerationResponse, BackendError> {
    Ok(GenerationResponse::text_only(text))
}

#[allow(dead_code)]
pub fn test_request() -> GenerationRequest {
    GenerationRequest {
        model: "test-model".to_string(),
        system_instruction: None,
        parts: vec![RequestPart::Text("Describe photosynthesis".to_string())],
        temperature: None,
    }
}

#[allow(dead_code)]
pub fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Generation service over `backend` with the test config.
#[allow(dead_code)]
pub fn test_service(backend: Arc<ScriptedBackend>) -> GenerationService {
    GenerationService::new(KeyRotatingExecutor::new(backend), Config::default())
}

/// Fresh state over an in-memory store.
#[allow(dead_code)]
pub fn test_state() -> AppState {
    AppState::with_db(Config::default(), LocalDb::in_memory())
}

/// State over `db` with the entitlement already unlocked.
#[allow(dead_code)]
pub fn entitled_state(db: LocalDb) -> AppState {
    db.save_entitlement(true).unwrap();
    AppState::with_db(Config::default(), db)
}

/// Fill in every required draft field.
#[allow(dead_code)]
pub fn fill_valid_draft(state: &mut AppState) {
    state.update_field(FieldUpdate::Topic("Photosynthesis".to_string()));
    state.update_field(FieldUpdate::MaterialType(Some(MaterialType::Infographic)));
    state.update_field(FieldUpdate::TargetAudience(Some(TargetAudience::Secondary)));
    state.update_field(FieldUpdate::Dimension(Some(Dimension::A4Portrait)));
    state.update_field(FieldUpdate::KeyContent(
        "Light, water and CO2 become glucose".to_string(),
    ));
}

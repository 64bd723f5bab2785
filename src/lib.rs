// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Edu-Visual: educational visual prompt generator
//!
//! This crate provides the application core behind the form-to-prompt UI:
//! the draft form model, local persistence, the key-rotating Gemini
//! executor, saved prompts and the entitlement gate. A UI shell drives it
//! through [`AppState`].

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod prompt;
pub mod services;
pub mod telemetry;
pub mod time_utils;

use app::{InFlight, ProgressTicker, Tab};
use config::Config;
use db::LocalDb;
use error::{AppError, Notification};
use models::{
    CredentialSet, Feature, FieldErrors, FieldUpdate, FormDraft, GeneratedImage, ImageCount,
    Profile, SavedPrompt,
};
use prompt::ImageUpload;
use services::generation::{ImageJobRequest, Job, JobOutcome};
use services::{
    ActivationClient, ActivationOutcome, EntitlementGate, GenerationRequest, GenerationService,
    SavedPromptRepository,
};

/// Application state owned by the UI thread.
///
/// Every mutation goes through a method here; errors are converted into
/// queued [`Notification`]s rather than returned.
pub struct AppState {
    pub config: Config,
    db: LocalDb,
    profile: Profile,
    credentials: CredentialSet,
    draft: FormDraft,
    field_errors: FieldErrors,
    current_prompt_id: Option<String>,
    saved_prompts: SavedPromptRepository,
    entitlement: EntitlementGate,
    active_tab: Tab,
    generated_prompt: Option<String>,
    generated_images: Vec<GeneratedImage>,
    analyzed_style: Option<String>,
    prompt_slot: InFlight,
    image_slot: InFlight,
    style_slot: InFlight,
    progress: ProgressTicker,
    api_key_settings_open: bool,
    upgrade_prompt_open: bool,
    notifications: Vec<Notification>,
}

impl AppState {
    /// Open the file-backed store from `config` and load all records.
    pub fn open(config: Config) -> Result<Self, AppError> {
        let db = LocalDb::open(&config)?;
        Ok(Self::with_db(config, db))
    }

    /// Load all records from `db`. Never fails: bad records load as defaults.
    pub fn with_db(config: Config, db: LocalDb) -> Self {
        let profile = db.load_profile();
        let credentials = db.load_credentials();
        let saved_prompts = SavedPromptRepository::load(db.clone());
        let entitlement = EntitlementGate::load(
            db.clone(),
            ActivationClient::new(config.activation_url.clone()),
        );
        let draft = FormDraft::from_profile(&profile);

        tracing::info!(
            keys = credentials.len(),
            saved_prompts = saved_prompts.len(),
            entitled = entitlement.is_entitled(),
            "Application state loaded"
        );

        Self {
            config,
            db,
            profile,
            credentials,
            draft,
            field_errors: FieldErrors::new(),
            current_prompt_id: None,
            saved_prompts,
            entitlement,
            active_tab: Tab::default(),
            generated_prompt: None,
            generated_images: Vec::new(),
            analyzed_style: None,
            prompt_slot: InFlight::default(),
            image_slot: InFlight::default(),
            style_slot: InFlight::default(),
            progress: ProgressTicker::default(),
            api_key_settings_open: false,
            upgrade_prompt_open: false,
            notifications: Vec::new(),
        }
    }

    // ─── Read Access ─────────────────────────────────────────────

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn profile_incomplete(&self) -> bool {
        self.profile.is_incomplete()
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    pub fn has_credentials(&self) -> bool {
        !self.credentials.is_empty()
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn current_prompt_id(&self) -> Option<&str> {
        self.current_prompt_id.as_deref()
    }

    /// Saved prompts matching `filter`, most recently updated first.
    pub fn list_saved_prompts(&self, filter: &str) -> Vec<&SavedPrompt> {
        self.saved_prompts.list(filter)
    }

    pub fn is_entitled(&self) -> bool {
        self.entitlement.is_entitled()
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn generated_prompt(&self) -> Option<&str> {
        self.generated_prompt.as_deref()
    }

    pub fn generated_images(&self) -> &[GeneratedImage] {
        &self.generated_images
    }

    pub fn analyzed_style(&self) -> Option<&str> {
        self.analyzed_style.as_deref()
    }

    pub fn is_generating(&self) -> bool {
        self.prompt_slot.is_active()
    }

    pub fn is_generating_images(&self) -> bool {
        self.image_slot.is_active()
    }

    pub fn is_analyzing_style(&self) -> bool {
        self.style_slot.is_active()
    }

    pub fn progress(&self) -> u8 {
        self.progress.value()
    }

    pub fn api_key_settings_open(&self) -> bool {
        self.api_key_settings_open
    }

    pub fn upgrade_prompt_open(&self) -> bool {
        self.upgrade_prompt_open
    }

    /// Drain queued notifications for display.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, err: AppError) {
        if let Some(notification) = err.notification() {
            self.notifications.push(notification);
        }
    }

    /// Report the outcome of a write-through save.
    fn notify_saved(&mut self, warning: Option<AppError>, success: &str) {
        match warning {
            Some(err) => self.notify(err),
            None => self.notifications.push(Notification::info(success)),
        }
    }

    // ─── Navigation ──────────────────────────────────────────────

    /// Switch areas; gated areas fall back to prompt creation when locked.
    pub fn navigate(&mut self, tab: Tab) {
        if tab.requires_entitlement() && !self.is_entitled() {
            tracing::debug!(?tab, "Gated area requested without entitlement");
            self.active_tab = Tab::CreatePrompt;
            return;
        }
        self.active_tab = tab;
    }

    pub fn open_api_key_settings(&mut self) {
        self.api_key_settings_open = true;
    }

    pub fn close_api_key_settings(&mut self) {
        self.api_key_settings_open = false;
    }

    pub fn close_upgrade_prompt(&mut self) {
        self.upgrade_prompt_open = false;
    }

    /// Hand the generated prompt to the image generator.
    ///
    /// Returns the prompt text (for the clipboard). Opens the image area
    /// when entitled, otherwise the upgrade prompt.
    pub fn copy_to_image_generator(&mut self) -> Option<String> {
        let prompt = self.generated_prompt.clone()?;
        if self.is_entitled() {
            self.active_tab = Tab::CreateImage;
        } else {
            self.upgrade_prompt_open = true;
        }
        Some(prompt)
    }

    // ─── Draft Editing ───────────────────────────────────────────

    /// Apply a field edit and clear that field's pending error.
    pub fn update_field(&mut self, update: FieldUpdate) {
        self.field_errors.remove(update.field());
        self.draft.update_field(update);
    }

    pub fn toggle_feature(&mut self, feature: Feature) {
        self.draft.toggle_feature(feature);
    }

    // ─── Saved Prompts ───────────────────────────────────────────

    /// Start a fresh draft seeded from the profile.
    pub fn new_prompt(&mut self) {
        self.current_prompt_id = None;
        self.draft.reset(Some(FormDraft::from_profile(&self.profile)));
        self.field_errors = FieldErrors::new();
        self.generated_prompt = None;
        self.active_tab = Tab::CreatePrompt;
    }

    /// Load a saved prompt into the draft.
    pub fn select_prompt(&mut self, id: &str) {
        match self.saved_prompts.load_as_draft(id) {
            Ok(draft) => {
                self.current_prompt_id = Some(id.to_string());
                self.draft.reset(Some(draft));
                self.field_errors = FieldErrors::new();
                self.generated_prompt = None;
                self.active_tab = Tab::CreatePrompt;
            }
            Err(e) => self.notify(e),
        }
    }

    /// Save the draft as a new prompt, or over the selected one.
    pub fn save_current_prompt(&mut self) {
        match self
            .saved_prompts
            .save(&self.draft, self.current_prompt_id.as_deref())
        {
            Ok(stored) => {
                self.current_prompt_id = Some(stored.value);
                self.notify_saved(stored.warning, "Prompt saved.");
            }
            Err(e) => self.notify(e),
        }
    }

    /// Delete a saved prompt; deleting the selected one starts a new draft.
    pub fn delete_prompt(&mut self, id: &str) {
        let stored = self.saved_prompts.delete(id);
        if let Some(err) = stored.warning {
            self.notify(err);
        }
        if self.current_prompt_id.as_deref() == Some(id) {
            self.new_prompt();
        }
    }

    // ─── Profile & Credentials ───────────────────────────────────

    /// Replace the profile and persist it.
    ///
    /// On success the draft's audience and subject are re-seeded from it.
    pub fn save_profile(&mut self, profile: Profile) {
        self.profile = profile;
        match self.db.save_profile(&self.profile) {
            Ok(()) => {
                self.draft.target_audience = self.profile.grade_level;
                self.draft.subject = self.profile.main_subject.clone();
                self.notifications
                    .push(Notification::info("Profile saved."));
                self.active_tab = Tab::CreatePrompt;
            }
            Err(e) => self.notify(e),
        }
    }

    /// Replace the API keys and persist them.
    pub fn save_credentials(&mut self, credentials: CredentialSet) {
        self.credentials = credentials;
        let flushed = self.db.save_credentials(&self.credentials);
        self.notify_saved(flushed.err(), "API keys saved.");
        self.api_key_settings_open = false;
    }

    /// Test the first candidate key with a live call.
    pub async fn verify_credentials(
        &mut self,
        service: &GenerationService,
        candidate: &CredentialSet,
    ) -> bool {
        if candidate.is_empty() {
            self.notifications.push(Notification::error(
                "Please enter at least one API key to check.",
            ));
            return false;
        }
        match service.verify_credentials(candidate).await {
            Ok(()) => {
                self.notifications
                    .push(Notification::info("Connection successful. The API key works."));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "API key verification failed");
                self.notifications.push(Notification::error(
                    "Connection failed. Please check the key.",
                ));
                false
            }
        }
    }

    // ─── Entitlement ─────────────────────────────────────────────

    /// Verify an activation code and unlock premium areas on success.
    pub async fn activate(&mut self, code: &str) -> ActivationOutcome {
        let stored = self.entitlement.activate(code).await;
        if let Some(err) = stored.warning {
            self.notify(err);
        }
        if stored.value.success {
            self.upgrade_prompt_open = false;
        }
        stored.value
    }

    // ─── Prompt Generation ───────────────────────────────────────

    /// Validate the draft and mint a prompt-generation job.
    ///
    /// Cancels any prompt generation still in flight. Returns `None` when
    /// the draft is invalid (errors are shown per field) or no key is set.
    pub fn begin_prompt_generation(&mut self) -> Option<Job<GenerationRequest>> {
        let validation = self.draft.validate();
        if !validation.valid {
            self.field_errors = validation.field_errors;
            return None;
        }
        self.field_errors = FieldErrors::new();

        if !self.has_credentials() {
            self.notify(AppError::MissingCredentials);
            self.api_key_settings_open = true;
            return None;
        }

        let token = self.prompt_slot.begin();
        self.progress.start();
        Some(Job {
            token,
            request: prompt::prompt_request(&self.draft, &self.profile, &self.config),
            credentials: self.credentials.clone(),
        })
    }

    /// Apply a finished prompt-generation job. Cancelled jobs are dropped.
    pub fn finish_prompt_generation(&mut self, outcome: JobOutcome<String>) {
        if outcome.is_cancelled() || !self.prompt_slot.finish(&outcome.token) {
            tracing::debug!("Dropping cancelled prompt generation result");
            return;
        }
        self.progress.complete();
        match outcome.result {
            Ok(text) => self.generated_prompt = Some(text),
            Err(e) => self.notify(e),
        }
    }

    pub fn cancel_prompt_generation(&mut self) {
        self.prompt_slot.cancel();
        self.progress.reset();
    }

    /// Advance the cosmetic progress bar (call every tick interval).
    pub fn tick_progress(&mut self) {
        self.progress.tick();
    }

    // ─── Image Generation ────────────────────────────────────────

    /// Mint an image-generation job for `prompt`.
    pub fn begin_image_generation(
        &mut self,
        prompt: &str,
        count: ImageCount,
    ) -> Option<Job<ImageJobRequest>> {
        if !self.is_entitled() {
            self.upgrade_prompt_open = true;
            return None;
        }
        let request = match prompt::image_request(prompt, &self.config) {
            Ok(request) => request,
            Err(e) => {
                self.notify(e);
                return None;
            }
        };
        if !self.has_credentials() {
            self.api_key_settings_open = true;
            return None;
        }

        self.generated_images.clear();
        let token = self.image_slot.begin();
        Some(Job {
            token,
            request: ImageJobRequest {
                request,
                prompt: prompt.trim().to_string(),
                count,
            },
            credentials: self.credentials.clone(),
        })
    }

    pub fn finish_image_generation(&mut self, outcome: JobOutcome<Vec<GeneratedImage>>) {
        if outcome.is_cancelled() || !self.image_slot.finish(&outcome.token) {
            tracing::debug!("Dropping cancelled image generation result");
            return;
        }
        match outcome.result {
            Ok(images) => self.generated_images = images,
            Err(e) => self.notify(e),
        }
    }

    pub fn cancel_image_generation(&mut self) {
        self.image_slot.cancel();
    }

    // ─── Style Analysis ──────────────────────────────────────────

    /// Mint a style-analysis job for an uploaded image.
    pub fn begin_style_analysis(&mut self, image: &ImageUpload) -> Option<Job<GenerationRequest>> {
        if !self.is_entitled() {
            self.upgrade_prompt_open = true;
            return None;
        }
        if !self.has_credentials() {
            self.api_key_settings_open = true;
            return None;
        }

        self.analyzed_style = None;
        let token = self.style_slot.begin();
        Some(Job {
            token,
            request: prompt::style_analysis_request(image, &self.config),
            credentials: self.credentials.clone(),
        })
    }

    pub fn finish_style_analysis(&mut self, outcome: JobOutcome<String>) {
        if outcome.is_cancelled() || !self.style_slot.finish(&outcome.token) {
            return;
        }
        match outcome.result {
            Ok(style) => self.analyzed_style = Some(style),
            Err(e) => self.notify(e),
        }
    }

    pub fn cancel_style_analysis(&mut self) {
        self.style_slot.cancel();
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Generation jobs: prompt writing, image rendering, style analysis.
//!
//! A job is minted by [`crate::AppState`] (validation, credential check,
//! cancellation token), run here (the only step that awaits), and handed
//! back to the state as a [`JobOutcome`].

use crate::config::Config;
use crate::error::AppError;
use crate::models::image::DEFAULT_IMAGE_MIME;
use crate::models::{CredentialSet, GeneratedImage, ImageCount};
use crate::prompt::{self, STYLE_FALLBACK};
use crate::services::gemini::{GeminiClient, GenerationRequest};
use crate::services::rotation::KeyRotatingExecutor;
use crate::time_utils::now_millis;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Work item for one generation run.
#[derive(Debug, Clone)]
pub struct Job<R> {
    pub token: CancellationToken,
    pub request: R,
    pub credentials: CredentialSet,
}

/// Image rendering request: the prompt and how many images to render.
#[derive(Debug, Clone)]
pub struct ImageJobRequest {
    pub request: GenerationRequest,
    pub prompt: String,
    pub count: ImageCount,
}

/// Result of a job together with the token it ran under.
#[derive(Debug)]
pub struct JobOutcome<T> {
    pub token: CancellationToken,
    pub result: Result<T, AppError>,
}

impl<T> JobOutcome<T> {
    /// Whether the job was cancelled; its result must then be dropped.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || matches!(self.result, Err(AppError::Cancelled))
    }
}

/// Runs generation jobs against the configured backend.
#[derive(Clone)]
pub struct GenerationService {
    executor: KeyRotatingExecutor,
    config: Config,
}

impl GenerationService {
    pub fn new(executor: KeyRotatingExecutor, config: Config) -> Self {
        Self { executor, config }
    }

    /// Service backed by the Gemini REST API.
    pub fn gemini(config: Config) -> Self {
        let client = GeminiClient::new(config.gemini_base_url.clone());
        Self::new(KeyRotatingExecutor::new(Arc::new(client)), config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Write an image prompt, rotating keys on rate limits.
    pub async fn run_prompt(&self, job: Job<GenerationRequest>) -> JobOutcome<String> {
        let result = self
            .executor
            .execute(&job.request, job.credentials.as_slice(), 0, &job.token)
            .await;
        JobOutcome {
            token: job.token,
            result,
        }
    }

    /// Render images, assigning keys round robin (no failover).
    pub async fn run_images(&self, job: Job<ImageJobRequest>) -> JobOutcome<Vec<GeneratedImage>> {
        let result = self.render_images(&job).await;
        JobOutcome {
            token: job.token,
            result,
        }
    }

    async fn render_images(
        &self,
        job: &Job<ImageJobRequest>,
    ) -> Result<Vec<GeneratedImage>, AppError> {
        let keys = job.credentials.as_slice();
        if keys.is_empty() {
            return Err(AppError::MissingCredentials);
        }

        let mut images = Vec::new();
        for i in 0..job.request.count.get() {
            if job.token.is_cancelled() {
                return Err(AppError::Cancelled);
            }

            let key = &keys[i % keys.len()];
            tracing::debug!(image = i, key_index = i % keys.len(), "Requesting image");
            let result = self
                .executor
                .backend()
                .generate(key, &job.request.request)
                .await;

            if job.token.is_cancelled() {
                return Err(AppError::Cancelled);
            }

            let response = result?;
            for (mime_type, data) in response.inline_data() {
                images.push(GeneratedImage {
                    id: format!("{}{}", now_millis(), images.len()),
                    mime_type: mime_type.unwrap_or(DEFAULT_IMAGE_MIME).to_string(),
                    data: data.to_string(),
                    prompt: job.request.prompt.clone(),
                });
            }
        }

        tracing::info!(count = images.len(), "Images generated");
        Ok(images)
    }

    /// Extract comma-separated style descriptors from an uploaded image.
    pub async fn run_style_analysis(&self, job: Job<GenerationRequest>) -> JobOutcome<String> {
        let result = self
            .executor
            .execute(&job.request, job.credentials.as_slice(), 0, &job.token)
            .await
            .map(|text| {
                if text.is_empty() {
                    STYLE_FALLBACK.to_string()
                } else {
                    text
                }
            });
        JobOutcome {
            token: job.token,
            result,
        }
    }

    /// Check that the first configured key can reach the API.
    pub async fn verify_credentials(&self, credentials: &CredentialSet) -> Result<(), AppError> {
        let key = credentials.first().ok_or(AppError::MissingCredentials)?;
        let request = prompt::connection_test_request(&self.config);
        self.executor.backend().generate(key, &request).await?;
        tracing::info!("API key verified");
        Ok(())
    }
}

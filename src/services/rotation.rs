// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Key-rotating request executor.
//!
//! Users may configure several personal API keys. When one key is rate
//! limited the same request is retried immediately with the next key; any
//! other failure stops the rotation at once.

use crate::error::AppError;
use crate::services::gemini::{BackendError, GenerationRequest, GenerationResponse, GenerativeBackend};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Dispatches requests over an ordered list of credentials.
#[derive(Clone)]
pub struct KeyRotatingExecutor {
    backend: Arc<dyn GenerativeBackend>,
}

impl KeyRotatingExecutor {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    /// The backend requests are sent through.
    pub fn backend(&self) -> &Arc<dyn GenerativeBackend> {
        &self.backend
    }

    /// Run `request` and return its text, trimmed.
    ///
    /// Starts at `credentials[start_index]` and moves to the next key only on
    /// a rate-limit signal. Fails with `ExhaustedCredentials` once the list is
    /// used up (immediately for an empty list or an out-of-range start).
    pub async fn execute(
        &self,
        request: &GenerationRequest,
        credentials: &[String],
        start_index: usize,
        cancel: &CancellationToken,
    ) -> Result<String, AppError> {
        let response = self
            .execute_response(request, credentials, start_index, cancel)
            .await?;
        Ok(response.text().trim().to_string())
    }

    /// Like [`execute`](Self::execute) but returns the full response.
    pub async fn execute_response(
        &self,
        request: &GenerationRequest,
        credentials: &[String],
        start_index: usize,
        cancel: &CancellationToken,
    ) -> Result<GenerationResponse, AppError> {
        for (index, credential) in credentials.iter().enumerate().skip(start_index) {
            tracing::debug!(index, model = %request.model, "Sending generation request");

            let result = self.backend.generate(credential, request).await;

            if cancel.is_cancelled() {
                tracing::debug!(index, "Generation cancelled, discarding result");
                return Err(AppError::Cancelled);
            }

            match result {
                Ok(response) => {
                    tracing::info!(index, "Generation request succeeded");
                    return Ok(response);
                }
                Err(e) if e.is_rate_limited() => {
                    tracing::warn!(index, "API key rate limited, rotating to next key");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "Generation request failed");
                    return Err(e.into());
                }
            }
        }

        tracing::warn!(
            keys = credentials.len(),
            start_index,
            "No API keys left to try"
        );
        Err(AppError::ExhaustedCredentials)
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::RateLimited(msg) => AppError::RateLimited(msg),
            BackendError::Http { message, .. } => AppError::Upstream(message),
            BackendError::Transport(msg) | BackendError::InvalidResponse(msg) => {
                AppError::Upstream(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::gemini::RequestPart;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend that rate-limits keys starting with "limited" and fails keys
    /// starting with "bad".
    #[derive(Default)]
    struct KeyedBackend {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl GenerativeBackend for KeyedBackend {
        async fn generate(
            &self,
            credential: &str,
            _request: &GenerationRequest,
        ) -> Result<GenerationResponse, BackendError> {
            self.calls.lock().unwrap().push(credential.to_string());
            if credential.starts_with("limited") {
                Err(BackendError::RateLimited("quota".to_string()))
            } else if credential.starts_with("bad") {
                Err(BackendError::Http {
                    status: 400,
                    message: "API key not valid".to_string(),
                })
            } else {
                Ok(GenerationResponse::text_only(format!("  ok from {}\n", credential)))
            }
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            model: "test-model".to_string(),
            system_instruction: None,
            parts: vec![RequestPart::Text("hi".to_string())],
            temperature: None,
        }
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_start_index_skips_earlier_keys() {
        let backend = Arc::new(KeyedBackend::default());
        let executor = KeyRotatingExecutor::new(backend.clone());

        let text = executor
            .execute(&request(), &keys(&["a", "b"]), 1, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(text, "ok from b");
        assert_eq!(*backend.calls.lock().unwrap(), keys(&["b"]));
    }

    #[tokio::test]
    async fn test_start_index_past_end_makes_no_calls() {
        let backend = Arc::new(KeyedBackend::default());
        let executor = KeyRotatingExecutor::new(backend.clone());

        let err = executor
            .execute(&request(), &keys(&["a"]), 1, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ExhaustedCredentials));
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_result_is_discarded() {
        let backend = Arc::new(KeyedBackend::default());
        let executor = KeyRotatingExecutor::new(backend.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = executor
            .execute(&request(), &keys(&["a"]), 0, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Cancelled));
        assert_eq!(backend.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_backend_error_mapping() {
        let err: AppError = BackendError::Transport("connection reset".to_string()).into();
        assert!(matches!(err, AppError::Upstream(ref m) if m == "connection reset"));

        let err: AppError = BackendError::RateLimited("slow down".to_string()).into();
        assert!(err.is_rate_limited());
    }
}

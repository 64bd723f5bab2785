// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent user-facing notifications.

use crate::models::FieldErrors;
use serde::Serialize;

/// Application error type that converts to UI notifications.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid form: {0}")]
    Validation(FieldErrors),

    #[error("No API key configured")]
    MissingCredentials,

    #[error("API key rate limited: {0}")]
    RateLimited(String),

    #[error("All API keys are rate limited or invalid")]
    ExhaustedCredentials,

    #[error("Generation API error: {0}")]
    Upstream(String),

    #[error("Storage quota exceeded while writing {key}")]
    StorageQuotaExceeded { key: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Build a validation error carrying a single field message.
    pub fn invalid(field: crate::models::Field, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field, message.into());
        AppError::Validation(errors)
    }

    /// Whether this error is a per-credential quota signal.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::RateLimited(_))
    }

    /// Convert into the notification shown to the user.
    ///
    /// Returns `None` for cancellations, which are never surfaced.
    pub fn notification(&self) -> Option<Notification> {
        let (level, message) = match self {
            AppError::Cancelled => return None,
            AppError::Validation(errors) => {
                let first = errors
                    .values()
                    .next()
                    .cloned()
                    .unwrap_or_else(|| "Please check the form".to_string());
                (NoticeLevel::Error, first)
            }
            AppError::MissingCredentials => (
                NoticeLevel::Error,
                "Please configure an API key to use AI features.".to_string(),
            ),
            AppError::RateLimited(_) => (
                NoticeLevel::Error,
                "The API key has hit its rate limit. Please try again shortly.".to_string(),
            ),
            AppError::ExhaustedCredentials => (
                NoticeLevel::Error,
                "All API keys are rate limited or invalid.".to_string(),
            ),
            AppError::Upstream(msg) => (NoticeLevel::Error, format!("AI request failed: {}", msg)),
            AppError::StorageQuotaExceeded { .. } => (
                NoticeLevel::Warning,
                "Could not save: browser storage is full (is the image too large?).".to_string(),
            ),
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage error");
                (NoticeLevel::Warning, "Could not save your changes.".to_string())
            }
            AppError::NotFound(msg) => (NoticeLevel::Error, format!("Not found: {}", msg)),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                (NoticeLevel::Error, "Something went wrong.".to_string())
            }
        };

        Some(Notification { level, message })
    }
}

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message queued for the UI (alert, toast, banner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Result type alias for application operations
pub type Result<T> = std::result::Result<T, AppError>;

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entitlement gate: unlocks premium areas via an activation code.
//!
//! The flag is cached locally and only ever flips from locked to unlocked.

use crate::db::{LocalDb, Stored};
use crate::error::AppError;
use serde::Deserialize;

/// Shown when the verification call cannot be completed.
const CONNECTION_FAILED: &str = "Connection error. Please try again later.";
/// Shown when the server rejects the code without a message.
const INVALID_CODE: &str = "Invalid activation code.";
/// Shown when the server accepts the code without a message.
const ACTIVATED: &str = "Activation successful!";

/// Verification endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Client for the activation-code verification endpoint.
#[derive(Clone)]
pub struct ActivationClient {
    http: reqwest::Client,
    url: String,
}

impl ActivationClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Send `code` to the endpoint as a query parameter.
    ///
    /// Any query string already present on the endpoint URL is kept.
    pub async fn verify(&self, code: &str) -> Result<ActivationResponse, AppError> {
        let response = self
            .http
            .get(&self.url)
            .query(&[("code", code)])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Activation request failed: {}", e)))?;

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Activation JSON parse error: {}", e)))
    }
}

/// Result of an activation attempt, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationOutcome {
    pub success: bool,
    pub message: String,
}

/// Cached entitlement flag plus the means to unlock it.
pub struct EntitlementGate {
    db: LocalDb,
    client: ActivationClient,
    entitled: bool,
}

impl EntitlementGate {
    /// Load the cached flag from storage.
    pub fn load(db: LocalDb, client: ActivationClient) -> Self {
        let entitled = db.load_entitlement();
        tracing::info!(entitled, "Loaded entitlement");
        Self {
            db,
            client,
            entitled,
        }
    }

    /// Cached state; never re-verified remotely.
    pub fn is_entitled(&self) -> bool {
        self.entitled
    }

    /// Verify `code` remotely and unlock on success.
    ///
    /// A failed persist still unlocks for this session; the storage error is
    /// reported as the warning.
    pub async fn activate(&mut self, code: &str) -> Stored<ActivationOutcome> {
        let code = code.trim();
        if code.is_empty() {
            return rejected("Please enter an activation code.".to_string());
        }

        let response = match self.client.verify(code).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Activation request failed");
                return rejected(CONNECTION_FAILED.to_string());
            }
        };

        let message = response.message.filter(|m| !m.trim().is_empty());
        if !response.success {
            tracing::info!("Activation code rejected");
            return rejected(message.unwrap_or_else(|| INVALID_CODE.to_string()));
        }

        self.entitled = true;
        let flushed = self.db.save_entitlement(true);
        tracing::info!(persisted = flushed.is_ok(), "Entitlement activated");

        Stored::new(
            ActivationOutcome {
                success: true,
                message: message.unwrap_or_else(|| ACTIVATED.to_string()),
            },
            flushed,
        )
    }
}

fn rejected(message: String) -> Stored<ActivationOutcome> {
    Stored::new(
        ActivationOutcome {
            success: false,
            message,
        },
        Ok(()),
    )
}

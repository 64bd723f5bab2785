// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! UI-facing state helpers: navigation tabs, in-flight request slots and the
//! cosmetic progress indicator.

use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Top-level feature areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    CreatePrompt,
    CreateImage,
    LearnIdeas,
    Profile,
}

impl Tab {
    /// Areas that need an active entitlement.
    pub fn requires_entitlement(&self) -> bool {
        matches!(self, Tab::CreateImage | Tab::LearnIdeas)
    }
}

/// At most one outstanding request per feature area.
///
/// Beginning a new request cancels the previous one, so a superseded
/// request's outcome is always recognisable by its cancelled token.
#[derive(Debug, Default)]
pub struct InFlight {
    current: Option<CancellationToken>,
}

impl InFlight {
    /// Cancel any outstanding request and hand out a fresh token.
    pub fn begin(&mut self) -> CancellationToken {
        if let Some(previous) = self.current.take() {
            tracing::debug!("Cancelling superseded request");
            previous.cancel();
        }
        let token = CancellationToken::new();
        self.current = Some(token.clone());
        token
    }

    /// Cancel the outstanding request. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        match self.current.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Close the slot for a finished request.
    ///
    /// Returns whether the outcome should be applied: false for cancelled
    /// requests and when nothing is outstanding.
    pub fn finish(&mut self, token: &CancellationToken) -> bool {
        if token.is_cancelled() || self.current.is_none() {
            return false;
        }
        self.current = None;
        true
    }
}

/// How often the UI should call [`ProgressTicker::tick`].
pub const PROGRESS_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Progress never passes this value until the request completes.
const PROGRESS_CEILING: u8 = 90;
const PROGRESS_STEPS: [u8; 4] = [12, 7, 15, 9];

/// Cosmetic progress bar value (0-100) shown while a prompt is generated.
///
/// Unrelated to the actual request state.
#[derive(Debug, Clone, Default)]
pub struct ProgressTicker {
    value: u8,
    ticks: usize,
    running: bool,
}

impl ProgressTicker {
    pub fn start(&mut self) {
        self.value = 0;
        self.ticks = 0;
        self.running = true;
    }

    pub fn tick(&mut self) {
        if !self.running || self.value >= PROGRESS_CEILING {
            return;
        }
        let step = PROGRESS_STEPS[self.ticks % PROGRESS_STEPS.len()];
        self.value = (self.value + step).min(PROGRESS_CEILING);
        self.ticks += 1;
    }

    pub fn complete(&mut self) {
        self.running = false;
        self.value = 100;
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.value = 0;
    }

    pub fn value(&self) -> u8 {
        self.value
    }
}

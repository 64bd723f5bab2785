// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Business logic services.

pub mod entitlement;
pub mod gemini;
pub mod generation;
pub mod rotation;
pub mod saved_prompts;

pub use entitlement::{ActivationClient, ActivationOutcome, EntitlementGate};
pub use gemini::{GeminiClient, GenerationRequest, GenerativeBackend};
pub use generation::{GenerationService, ImageJobRequest, Job, JobOutcome};
pub use rotation::KeyRotatingExecutor;
pub use saved_prompts::SavedPromptRepository;

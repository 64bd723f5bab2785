// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod catalog;
pub mod credentials;
pub mod draft;
pub mod image;
pub mod profile;
pub mod saved_prompt;

pub use catalog::{
    ContentLanguage, Dimension, EducationField, Feature, ImageQuality, MaterialType,
    TargetAudience, VisualStyle,
};
pub use credentials::CredentialSet;
pub use draft::{Field, FieldErrors, FieldUpdate, FormDraft, KeyContentMode, Validation};
pub use image::{GeneratedImage, ImageCount};
pub use profile::Profile;
pub use saved_prompt::SavedPrompt;

use serde::{de::DeserializeOwned, Deserialize, Deserializer};

/// Deserialize a stored field, falling back to its type's default when the
/// stored value has the wrong shape.
///
/// Combined with `#[serde(default)]` this makes records tolerant of both
/// missing and malformed fields. Fields whose record default differs from the
/// type default use [`lenient_or`] instead.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    lenient_or(deserializer, T::default)
}

/// Like [`lenient`], but a malformed value is replaced by `fallback()`.
pub(crate) fn lenient_or<'de, D, T>(
    deserializer: D,
    fallback: impl FnOnce() -> T,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|_| fallback()))
}

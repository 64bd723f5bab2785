// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The in-progress generation request and its validation rules.

use super::catalog::{
    ContentLanguage, Dimension, EducationField, Feature, ImageQuality, MaterialType,
    TargetAudience, VisualStyle,
};
use super::{lenient, lenient_or};
use super::profile::Profile;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Where the key content of the material comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum KeyContentMode {
    /// The teacher types the content.
    #[default]
    UserSupplied,
    /// The model proposes content aligned with the curriculum.
    AiSuggested,
}

/// Draft describing one generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FormDraft {
    #[serde(deserialize_with = "lenient")]
    pub topic: String,
    #[serde(deserialize_with = "lenient_education_field")]
    pub education_field: Option<EducationField>,
    /// Only meaningful for K-12 drafts
    #[serde(deserialize_with = "lenient")]
    pub subject: String,
    #[serde(deserialize_with = "lenient")]
    pub material_type: Option<MaterialType>,
    #[serde(deserialize_with = "lenient")]
    pub target_audience: Option<TargetAudience>,
    /// Free text used when `target_audience` is `Other`
    #[serde(deserialize_with = "lenient")]
    pub custom_target_audience: String,
    #[serde(deserialize_with = "lenient")]
    pub content_language: ContentLanguage,
    #[serde(deserialize_with = "lenient")]
    pub key_content_mode: KeyContentMode,
    #[serde(deserialize_with = "lenient")]
    pub key_content: String,
    #[serde(deserialize_with = "lenient_features")]
    pub features: BTreeSet<Feature>,
    #[serde(deserialize_with = "lenient")]
    pub visual_style: Option<VisualStyle>,
    /// Free text used when `visual_style` is `Other`
    #[serde(deserialize_with = "lenient")]
    pub custom_style: String,
    #[serde(deserialize_with = "lenient")]
    pub dimension: Option<Dimension>,
    #[serde(deserialize_with = "lenient_image_quality")]
    pub image_quality: Option<ImageQuality>,
}

impl Default for FormDraft {
    fn default() -> Self {
        Self {
            topic: String::new(),
            education_field: Some(EducationField::K12),
            subject: String::new(),
            material_type: None,
            target_audience: None,
            custom_target_audience: String::new(),
            content_language: ContentLanguage::default(),
            key_content_mode: KeyContentMode::default(),
            key_content: String::new(),
            features: BTreeSet::new(),
            visual_style: None,
            custom_style: String::new(),
            dimension: None,
            image_quality: Some(ImageQuality::default()),
        }
    }
}

fn lenient_education_field<'de, D>(deserializer: D) -> Result<Option<EducationField>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_or(deserializer, || FormDraft::default().education_field)
}

fn lenient_image_quality<'de, D>(deserializer: D) -> Result<Option<ImageQuality>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_or(deserializer, || FormDraft::default().image_quality)
}

/// Keep known feature ids and drop anything else.
fn lenient_features<'de, D>(deserializer: D) -> Result<BTreeSet<Feature>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let features = match value {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().and_then(Feature::from_id))
            .collect(),
        _ => BTreeSet::new(),
    };
    Ok(features)
}

/// Names of form fields, draft fields first in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Topic,
    EducationField,
    Subject,
    MaterialType,
    TargetAudience,
    CustomTargetAudience,
    Dimension,
    ImageQuality,
    ContentLanguage,
    KeyContentMode,
    KeyContent,
    VisualStyle,
    CustomStyle,
    /// Profile avatar upload
    Avatar,
    /// Prompt text in the image generator
    Prompt,
    /// Image uploaded for style analysis
    Image,
}

/// One edit to a single draft field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Topic(String),
    EducationField(Option<EducationField>),
    Subject(String),
    MaterialType(Option<MaterialType>),
    TargetAudience(Option<TargetAudience>),
    CustomTargetAudience(String),
    ContentLanguage(ContentLanguage),
    KeyContentMode(KeyContentMode),
    KeyContent(String),
    VisualStyle(Option<VisualStyle>),
    CustomStyle(String),
    Dimension(Option<Dimension>),
    ImageQuality(Option<ImageQuality>),
}

impl FieldUpdate {
    /// The field this update writes.
    pub fn field(&self) -> Field {
        match self {
            FieldUpdate::Topic(_) => Field::Topic,
            FieldUpdate::EducationField(_) => Field::EducationField,
            FieldUpdate::Subject(_) => Field::Subject,
            FieldUpdate::MaterialType(_) => Field::MaterialType,
            FieldUpdate::TargetAudience(_) => Field::TargetAudience,
            FieldUpdate::CustomTargetAudience(_) => Field::CustomTargetAudience,
            FieldUpdate::ContentLanguage(_) => Field::ContentLanguage,
            FieldUpdate::KeyContentMode(_) => Field::KeyContentMode,
            FieldUpdate::KeyContent(_) => Field::KeyContent,
            FieldUpdate::VisualStyle(_) => Field::VisualStyle,
            FieldUpdate::CustomStyle(_) => Field::CustomStyle,
            FieldUpdate::Dimension(_) => Field::Dimension,
            FieldUpdate::ImageQuality(_) => Field::ImageQuality,
        }
    }
}

/// Per-field validation messages, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, message: String) {
        self.0.insert(field, message);
    }

    pub fn remove(&mut self, field: Field) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = &String> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        f.write_str(&messages.join("; "))
    }
}

/// Outcome of validating a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub field_errors: FieldErrors,
}

impl FormDraft {
    /// Fresh draft seeded from the teacher's profile.
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            target_audience: profile.grade_level,
            subject: profile.main_subject.clone(),
            ..Self::default()
        }
    }

    /// Apply one field edit.
    ///
    /// Leaving the K-12 education field clears the subject.
    pub fn update_field(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Topic(v) => self.topic = v,
            FieldUpdate::EducationField(v) => {
                if v != Some(EducationField::K12) {
                    self.subject.clear();
                }
                self.education_field = v;
            }
            FieldUpdate::Subject(v) => self.subject = v,
            FieldUpdate::MaterialType(v) => self.material_type = v,
            FieldUpdate::TargetAudience(v) => self.target_audience = v,
            FieldUpdate::CustomTargetAudience(v) => self.custom_target_audience = v,
            FieldUpdate::ContentLanguage(v) => self.content_language = v,
            FieldUpdate::KeyContentMode(v) => self.key_content_mode = v,
            FieldUpdate::KeyContent(v) => self.key_content = v,
            FieldUpdate::VisualStyle(v) => self.visual_style = v,
            FieldUpdate::CustomStyle(v) => self.custom_style = v,
            FieldUpdate::Dimension(v) => self.dimension = v,
            FieldUpdate::ImageQuality(v) => self.image_quality = v,
        }
    }

    /// Select the feature if absent, deselect it if present.
    pub fn toggle_feature(&mut self, feature: Feature) {
        if !self.features.remove(&feature) {
            self.features.insert(feature);
        }
    }

    /// Replace the draft with `seed`, or with an empty draft.
    pub fn reset(&mut self, seed: Option<FormDraft>) {
        *self = seed.unwrap_or_default();
    }

    /// Check every required field and report all failures at once.
    pub fn validate(&self) -> Validation {
        let mut errors = FieldErrors::new();

        if self.topic.trim().is_empty() {
            errors.insert(Field::Topic, "Please enter the lesson topic".to_string());
        }
        if self.education_field.is_none() {
            errors.insert(
                Field::EducationField,
                "Please choose an education field".to_string(),
            );
        }
        if self.material_type.is_none() {
            errors.insert(
                Field::MaterialType,
                "Please choose a material type".to_string(),
            );
        }
        match self.target_audience {
            None => errors.insert(
                Field::TargetAudience,
                "Please choose the target audience".to_string(),
            ),
            Some(TargetAudience::Other) if self.custom_target_audience.trim().is_empty() => errors
                .insert(
                    Field::CustomTargetAudience,
                    "Please describe the target audience".to_string(),
                ),
            Some(_) => {}
        }
        if self.dimension.is_none() {
            errors.insert(
                Field::Dimension,
                "Please choose the output dimension".to_string(),
            );
        }
        if self.image_quality.is_none() {
            errors.insert(
                Field::ImageQuality,
                "Please choose the image quality".to_string(),
            );
        }
        if self.key_content_mode == KeyContentMode::UserSupplied
            && self.key_content.trim().is_empty()
        {
            errors.insert(
                Field::KeyContent,
                "Please enter the content or let the AI suggest it".to_string(),
            );
        }
        if self.visual_style == Some(VisualStyle::Other) && self.custom_style.trim().is_empty() {
            errors.insert(
                Field::CustomStyle,
                "Please describe the visual style".to_string(),
            );
        }

        Validation {
            valid: errors.is_empty(),
            field_errors: errors,
        }
    }

    /// Audience text used in prompts (free text when `Other` is chosen).
    pub fn audience_text(&self) -> Option<&str> {
        match self.target_audience {
            Some(TargetAudience::Other) => Some(self.custom_target_audience.trim()),
            Some(audience) => Some(audience.label()),
            None => None,
        }
    }

    /// Style text used in prompts (free text when `Other` is chosen).
    pub fn style_text(&self) -> Option<&str> {
        match self.visual_style {
            Some(VisualStyle::Other) => Some(self.custom_style.trim()),
            Some(style) => Some(style.label()),
            None => None,
        }
    }
}

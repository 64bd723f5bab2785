//! Teacher profile model.

use super::catalog::TargetAudience;
use super::{lenient, lenient_or};
use crate::error::AppError;
use serde::{Deserialize, Deserializer, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Largest avatar image accepted, in bytes of the encoded data URL.
pub const MAX_AVATAR_BYTES: usize = 1024 * 1024;

/// Teacher profile (singleton per installation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Profile {
    /// Display name
    #[serde(rename = "fullName", deserialize_with = "lenient")]
    pub display_name: String,
    /// Avatar image as a data URL
    #[serde(rename = "avatarUrl", deserialize_with = "lenient")]
    pub avatar: Option<String>,
    /// Grade level usually taught
    #[serde(deserialize_with = "lenient_grade_level")]
    pub grade_level: Option<TargetAudience>,
    /// Primary subject
    #[serde(deserialize_with = "lenient")]
    pub main_subject: String,
    /// Secondary subject
    #[serde(deserialize_with = "lenient")]
    pub sub_subject: String,
    /// Free-text teaching style
    #[serde(deserialize_with = "lenient_teaching_style")]
    pub teaching_style: String,
    #[serde(deserialize_with = "lenient")]
    pub bio: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            avatar: None,
            grade_level: Some(TargetAudience::Primary),
            main_subject: String::new(),
            sub_subject: String::new(),
            teaching_style: "Cheerful, creative, student-centred".to_string(),
            bio: String::new(),
        }
    }
}

fn lenient_grade_level<'de, D>(deserializer: D) -> Result<Option<TargetAudience>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_or(deserializer, || Profile::default().grade_level)
}

fn lenient_teaching_style<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_or(deserializer, || Profile::default().teaching_style)
}

impl Profile {
    /// Whether the fields prompts rely on are still missing.
    pub fn is_incomplete(&self) -> bool {
        self.display_name.trim().is_empty()
            || self.main_subject.trim().is_empty()
            || self.grade_level.is_none()
    }

    /// Set the avatar, rejecting images over [`MAX_AVATAR_BYTES`].
    pub fn set_avatar(&mut self, data_url: String) -> Result<(), AppError> {
        if data_url.len() > MAX_AVATAR_BYTES {
            return Err(AppError::invalid(
                crate::models::Field::Avatar,
                "Avatar image is too large (max 1MB)",
            ));
        }
        self.avatar = Some(data_url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_incomplete() {
        let profile = Profile::default();
        assert!(profile.is_incomplete());
        assert_eq!(profile.grade_level, Some(TargetAudience::Primary));
    }

    #[test]
    fn test_complete_profile() {
        let profile = Profile {
            display_name: "Lan Nguyen".to_string(),
            main_subject: "Mathematics".to_string(),
            ..Profile::default()
        };
        assert!(!profile.is_incomplete());
    }

    #[test]
    fn test_avatar_size_limit() {
        let mut profile = Profile::default();
        assert!(profile.set_avatar("x".repeat(MAX_AVATAR_BYTES + 1)).is_err());
        assert!(profile.avatar.is_none());

        profile
            .set_avatar("data:image/png;base64,AAAA".to_string())
            .unwrap();
        assert!(profile.avatar.is_some());
    }

    #[test]
    fn test_uses_stored_field_names() {
        let json = r#"{"fullName":"An","avatarUrl":null,"gradeLevel":"university","mainSubject":"History"}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.display_name, "An");
        assert_eq!(profile.grade_level, Some(TargetAudience::University));
        // Missing fields keep their defaults
        assert_eq!(profile.teaching_style, Profile::default().teaching_style);
    }

    #[test]
    fn test_malformed_fields_keep_profile_defaults() {
        let json = r#"{"fullName":"Hoa","gradeLevel":"Tiểu học","mainSubject":"Math","teachingStyle":17}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.grade_level, Some(TargetAudience::Primary));
        assert_eq!(profile.teaching_style, Profile::default().teaching_style);
        assert!(!profile.is_incomplete());
    }
}

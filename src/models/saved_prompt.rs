//! Saved prompt snapshot model.

use super::draft::FormDraft;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A named, timestamped snapshot of a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SavedPrompt {
    /// Derived from the creation time; unique within the collection
    pub id: String,
    /// Topic of the draft at save time
    pub title: String,
    /// Epoch milliseconds
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub created_at: i64,
    /// Epoch milliseconds, never earlier than `created_at`
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub updated_at: i64,
    /// Owned copy of the draft
    #[serde(default)]
    pub data: FormDraft,
}

impl SavedPrompt {
    /// Last update as an RFC3339 string, for list display.
    pub fn updated_at_rfc3339(&self) -> Option<String> {
        crate::time_utils::format_millis_rfc3339(self.updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_loads_default_draft() {
        let prompt: SavedPrompt = serde_json::from_str(
            r#"{"id":"1700000000000","title":"Fractions","createdAt":1700000000000,"updatedAt":1700000000000}"#,
        )
        .unwrap();
        assert_eq!(prompt.data, FormDraft::default());
        assert_eq!(
            prompt.updated_at_rfc3339().as_deref(),
            Some("2023-11-14T22:13:20Z")
        );
    }
}

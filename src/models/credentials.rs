// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User-supplied API keys in rotation order.

use serde::{Deserialize, Deserializer, Serialize};

/// Ordered API keys; earlier keys are tried first.
///
/// Duplicates are allowed. The set is always replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CredentialSet(Vec<String>);

impl CredentialSet {
    /// Build a set from editor entries.
    ///
    /// Entries are trimmed and blanks dropped; an entry containing newlines
    /// (a multi-line paste) expands into one key per line, in place.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = entries
            .into_iter()
            .flat_map(|entry| {
                entry
                    .as_ref()
                    .lines()
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .collect();
        Self(keys)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for CredentialSet {
    /// Accept only an array of strings; anything else loads as empty.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let keys = match value {
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_str())
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        };
        Ok(Self(keys))
    }
}

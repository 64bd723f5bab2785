// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Generated image results.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// MIME type assumed when the API omits one.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// How many images to request in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageCount {
    #[default]
    One,
    Two,
}

impl ImageCount {
    pub fn get(self) -> usize {
        match self {
            ImageCount::One => 1,
            ImageCount::Two => 2,
        }
    }
}

/// One image returned by the image model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GeneratedImage {
    pub id: String,
    pub mime_type: String,
    /// Base64 payload
    pub data: String,
    /// Prompt the image was generated from
    pub prompt: String,
}

impl GeneratedImage {
    /// `data:` URL suitable for an `<img>` tag or a download link.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

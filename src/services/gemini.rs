// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gemini API client for text, image and multimodal generation.
//!
//! Handles:
//! - `generateContent` calls with a per-call API key
//! - Extraction of text and inline image payloads
//! - Rate limit detection (for key rotation)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One outbound generation call, independent of the key used to send it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub parts: Vec<RequestPart>,
    pub temperature: Option<f32>,
}

/// Content part of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPart {
    Text(String),
    /// Base64 payload with its MIME type
    InlineData { mime_type: String, data: String },
}

/// Content parts returned by the model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    pub parts: Vec<ResponsePart>,
}

/// Content part of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    Text(String),
    InlineData {
        mime_type: Option<String>,
        data: String,
    },
}

impl GenerationResponse {
    /// Response consisting of a single text part.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            parts: vec![ResponsePart::Text(text.into())],
        }
    }

    /// Concatenated text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ResponsePart::Text(text) => Some(text.as_str()),
                ResponsePart::InlineData { .. } => None,
            })
            .collect()
    }

    /// Inline binary payloads as `(mime_type, base64 data)`.
    pub fn inline_data(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        self.parts.iter().filter_map(|part| match part {
            ResponsePart::InlineData { mime_type, data } if !data.is_empty() => {
                Some((mime_type.as_deref(), data.as_str()))
            }
            _ => None,
        })
    }
}

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Quota or rate limit hit for the key used
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Whether trying the next key could help.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, BackendError::RateLimited(_))
    }
}

/// Seam between the executor and the generation service.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Send `request` authenticated with `credential`.
    async fn generate(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, BackendError>;
}

/// Gemini REST client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// Create a client against `base_url` (e.g. the public Gemini endpoint).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, BackendError> {
        let body = WireRequest::from(request);

        let response = self
            .http
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", credential)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), &body));
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("JSON parse error: {}", e)))?;

        Ok(wire.into())
    }
}

/// Status reported by Google APIs when a quota is exhausted.
const QUOTA_STATUS: &str = "RESOURCE_EXHAUSTED";

/// Map a failed HTTP response to a backend error.
///
/// This is the single rate-limit rule: HTTP 429, or a structured error body
/// whose status is `RESOURCE_EXHAUSTED`.
pub fn classify_failure(status: u16, body: &str) -> BackendError {
    let detail = serde_json::from_str::<WireErrorBody>(body)
        .ok()
        .map(|b| b.error);

    let quota_status = detail
        .as_ref()
        .and_then(|d| d.status.as_deref())
        .is_some_and(|s| s == QUOTA_STATUS);

    let message = detail
        .and_then(|d| d.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    if status == 429 || quota_status {
        tracing::warn!(status, "Gemini rate limit hit");
        return BackendError::RateLimited(message);
    }

    BackendError::Http { status, message }
}

// ─── Wire Format ─────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig>,
}

#[derive(Serialize, Deserialize, Default)]
struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<WireInlineData>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInlineData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

#[derive(Serialize)]
struct WireGenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Deserialize)]
struct WireCandidate {
    content: Option<WireContent>,
}

#[derive(Deserialize)]
struct WireErrorBody {
    error: WireErrorDetail,
}

#[derive(Deserialize)]
struct WireErrorDetail {
    message: Option<String>,
    status: Option<String>,
}

impl From<&RequestPart> for WirePart {
    fn from(part: &RequestPart) -> Self {
        match part {
            RequestPart::Text(text) => WirePart {
                text: Some(text.clone()),
                inline_data: None,
            },
            RequestPart::InlineData { mime_type, data } => WirePart {
                text: None,
                inline_data: Some(WireInlineData {
                    mime_type: Some(mime_type.clone()),
                    data: data.clone(),
                }),
            },
        }
    }
}

impl From<&GenerationRequest> for WireRequest {
    fn from(request: &GenerationRequest) -> Self {
        WireRequest {
            system_instruction: request.system_instruction.as_ref().map(|text| WireContent {
                role: None,
                parts: vec![WirePart {
                    text: Some(text.clone()),
                    inline_data: None,
                }],
            }),
            contents: vec![WireContent {
                role: Some("user".to_string()),
                parts: request.parts.iter().map(WirePart::from).collect(),
            }],
            generation_config: request
                .temperature
                .map(|temperature| WireGenerationConfig { temperature }),
        }
    }
}

impl From<WireResponse> for GenerationResponse {
    /// Only the first candidate is used.
    fn from(wire: WireResponse) -> Self {
        let parts = wire
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| match (part.text, part.inline_data) {
                (_, Some(inline)) => Some(ResponsePart::InlineData {
                    mime_type: inline.mime_type,
                    data: inline.data,
                }),
                (Some(text), None) => Some(ResponsePart::Text(text)),
                (None, None) => None,
            })
            .collect();
        GenerationResponse { parts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_429_is_rate_limited() {
        let err = classify_failure(429, "Too Many Requests");
        assert_eq!(err, BackendError::RateLimited("Too Many Requests".to_string()));
    }

    #[test]
    fn test_classify_resource_exhausted_body() {
        let body = r#"{"error":{"code":403,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = classify_failure(403, body);
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_classify_other_errors() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        let err = classify_failure(400, body);
        assert_eq!(
            err,
            BackendError::Http {
                status: 400,
                message: "API key not valid".to_string()
            }
        );
        // A message that merely mentions 429 is not a rate limit
        assert!(!classify_failure(500, "upstream said 429").is_rate_limited());
    }

    #[test]
    fn test_wire_request_shape() {
        let request = GenerationRequest {
            model: "m".to_string(),
            system_instruction: Some("sys".to_string()),
            parts: vec![
                RequestPart::InlineData {
                    mime_type: "image/png".to_string(),
                    data: "AAAA".to_string(),
                },
                RequestPart::Text("hello".to_string()),
            ],
            temperature: Some(0.5),
        };
        let json = serde_json::to_value(WireRequest::from(&request)).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(
            json["contents"][0]["parts"][0]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(json["contents"][0]["parts"][1]["text"], "hello");
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn test_response_extraction() {
        let wire: WireResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"Here you go "},
                {"inlineData":{"mimeType":"image/jpeg","data":"/9j/"}},
                {"text":"done"}
            ]}}]}"#,
        )
        .unwrap();
        let response = GenerationResponse::from(wire);
        assert_eq!(response.text(), "Here you go done");
        let images: Vec<_> = response.inline_data().collect();
        assert_eq!(images, vec![(Some("image/jpeg"), "/9j/")]);
    }

    #[test]
    fn test_empty_candidates() {
        let wire: WireResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(GenerationResponse::from(wire), GenerationResponse::default());
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Prompt composition: turns a validated draft (and other inputs) into
//! generation requests.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{Field, FormDraft, KeyContentMode, Profile};
use crate::services::gemini::{GenerationRequest, RequestPart};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

/// Largest image accepted for style analysis (decoded bytes).
pub const MAX_STYLE_IMAGE_BYTES: usize = 4 * 1024 * 1024;

/// Text returned when style analysis produces nothing.
pub const STYLE_FALLBACK: &str = "Unable to analyse the style of this image.";

const STYLE_ANALYSIS_INSTRUCTION: &str = "\
Act as an expert Art Director and AI Prompt Engineer.
Your task is to analyze the uploaded image and extract a \"Style Prompt\" that can be used to replicate this exact aesthetic.

STRICT RULES:
1. IGNORE the specific subject matter (do not mention specific people, objects, or text).
2. FOCUS ENTIRELY ON THE VISUAL STYLE:
   - Art medium (watercolor, 3D render, vector art, photography, oil painting).
   - Visual style (minimalist, cyberpunk, vintage, flat design, anime, realistic).
   - Lighting and atmosphere (cinematic lighting, soft focus, dramatic shadows).
   - Color palette (pastel, neon, monochrome, high contrast, vibrant).
   - Composition (isometric, macro, rule of thirds).
   - Rendering keywords (8k, octane render, detailed brush strokes).

OUTPUT FORMAT:
Return ONLY a comma-separated list of high-quality style modifiers. Do not write full sentences.";

/// System instruction for prompt writing, embedding quality and language.
pub fn system_instruction(draft: &FormDraft) -> String {
    let quality = draft.image_quality.map(|q| q.label()).unwrap_or_default();
    let language = draft.content_language.label();
    format!(
        "You are an expert prompt engineer specializing in Google Gemini and Imagen image generation models.
YOUR TASK: Write a single, highly detailed, optimized English prompt to generate an educational image resource.
CRITICAL OUTPUT RULES:
1. OUTPUT ONLY THE RAW PROMPT. No introductions.
2. The prompt MUST be in ENGLISH.
3. Focus heavily on VISUAL DETAILS: art style, lighting, composition, color palette.
4. Do NOT mention Midjourney or DALL-E.
5. Include specific instructions for the layout.
6. QUALITY SETTING: {quality}.
7. LANGUAGE HANDLING: Text visible in the design MUST be in {language}."
    )
}

/// User instruction rendering every draft field plus teacher context.
pub fn user_instruction(draft: &FormDraft, profile: &Profile) -> String {
    let audience = draft.audience_text().unwrap_or_default();
    let features: Vec<&str> = draft.features.iter().map(|f| f.label()).collect();
    let features = if features.is_empty() {
        "None".to_string()
    } else {
        features.join(", ")
    };

    let mut lines = vec![
        "Input Data:".to_string(),
        format!(
            "- Type: {}",
            draft.material_type.map(|m| m.label()).unwrap_or_default()
        ),
        format!(
            "- Field: {}",
            draft.education_field.map(|e| e.label()).unwrap_or_default()
        ),
        format!("- Topic: {}", draft.topic.trim()),
    ];
    if !draft.subject.trim().is_empty() {
        lines.push(format!("- Subject: {}", draft.subject.trim()));
    }
    lines.push(format!("- Audience: {}", audience));
    lines.push(format!(
        "- Dimensions: {}",
        draft.dimension.map(|d| d.label()).unwrap_or_default()
    ));
    lines.push(format!("- Style: {}", draft.style_text().unwrap_or_default()));
    lines.push(format!("- Language: {}", draft.content_language.label()));
    lines.push(format!("- Features: {}", features));

    match draft.key_content_mode {
        KeyContentMode::UserSupplied => {
            lines.push("- Content Mode: User content".to_string());
            lines.push(format!("- User Content: \"{}\"", draft.key_content.trim()));
        }
        KeyContentMode::AiSuggested => {
            lines.push("- Content Mode: AI suggests content".to_string());
            lines.push(format!(
                "- CONTENT STANDARDS: The educational knowledge, terminology, and concepts generated MUST strictly adhere to the Vietnam 2018 General Education Program standards appropriate for the {} level.",
                audience
            ));
        }
    }

    lines.push(format!(
        "- Teacher Context: {}, {}.",
        profile.display_name.trim(),
        profile.main_subject.trim()
    ));
    lines.push("Write optimized prompt in English.".to_string());
    lines.join("\n")
}

/// Request that asks the text model to write the image prompt.
pub fn prompt_request(draft: &FormDraft, profile: &Profile, config: &Config) -> GenerationRequest {
    GenerationRequest {
        model: config.text_model.clone(),
        system_instruction: Some(system_instruction(draft)),
        parts: vec![RequestPart::Text(user_instruction(draft, profile))],
        temperature: Some(config.temperature),
    }
}

/// Request that renders an image from a finished prompt.
pub fn image_request(prompt: &str, config: &Config) -> Result<GenerationRequest, AppError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::invalid(Field::Prompt, "Please enter a prompt"));
    }
    Ok(GenerationRequest {
        model: config.image_model.clone(),
        system_instruction: None,
        parts: vec![RequestPart::Text(prompt.to_string())],
        temperature: None,
    })
}

/// Request that extracts style descriptors from an uploaded image.
pub fn style_analysis_request(image: &ImageUpload, config: &Config) -> GenerationRequest {
    GenerationRequest {
        model: config.vision_model.clone(),
        system_instruction: None,
        parts: vec![
            RequestPart::InlineData {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            },
            RequestPart::Text(STYLE_ANALYSIS_INSTRUCTION.to_string()),
        ],
        temperature: None,
    }
}

/// Minimal request used to check that a key works.
pub fn connection_test_request(config: &Config) -> GenerationRequest {
    GenerationRequest {
        model: config.vision_model.clone(),
        system_instruction: None,
        parts: vec![RequestPart::Text("Test connection".to_string())],
        temperature: None,
    }
}

/// An image supplied for style analysis, base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub mime_type: String,
    pub data: String,
}

impl ImageUpload {
    /// Encode raw image bytes, enforcing the size limit.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Result<Self, AppError> {
        if bytes.len() > MAX_STYLE_IMAGE_BYTES {
            return Err(too_large());
        }
        Ok(Self {
            mime_type: mime_type.to_string(),
            data: BASE64.encode(bytes),
        })
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> Result<Self, AppError> {
        let malformed = || AppError::invalid(Field::Image, "Unsupported image data");

        let rest = url.strip_prefix("data:").ok_or_else(malformed)?;
        let (header, payload) = rest.split_once(',').ok_or_else(malformed)?;
        let mime_type = header.strip_suffix(";base64").ok_or_else(malformed)?;
        if mime_type.is_empty() {
            return Err(malformed());
        }

        let decoded = BASE64.decode(payload.trim()).map_err(|_| malformed())?;
        if decoded.len() > MAX_STYLE_IMAGE_BYTES {
            return Err(too_large());
        }
        Ok(Self {
            mime_type: mime_type.to_string(),
            data: payload.trim().to_string(),
        })
    }
}

fn too_large() -> AppError {
    AppError::invalid(Field::Image, "Image is too large (max 4MB)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ContentLanguage, Dimension, Feature, ImageQuality, MaterialType, TargetAudience,
        VisualStyle,
    };

    fn draft() -> FormDraft {
        FormDraft {
            topic: "Water cycle".to_string(),
            subject: "Geography".to_string(),
            material_type: Some(MaterialType::Poster),
            target_audience: Some(TargetAudience::Other),
            custom_target_audience: "Adult learners".to_string(),
            content_language: ContentLanguage::English,
            key_content: "Evaporation, condensation".to_string(),
            features: [Feature::Charts, Feature::Mascot].into_iter().collect(),
            visual_style: Some(VisualStyle::Watercolor),
            dimension: Some(Dimension::A3Portrait),
            image_quality: Some(ImageQuality::Uhd4k),
            ..FormDraft::default()
        }
    }

    #[test]
    fn test_system_instruction_embeds_quality_and_language() {
        let text = system_instruction(&draft());
        assert!(text.contains("QUALITY SETTING: 4K UHD"));
        assert!(text.contains("MUST be in English."));
    }

    #[test]
    fn test_user_instruction_renders_fields() {
        let profile = Profile {
            display_name: "Hoa".to_string(),
            main_subject: "Geography".to_string(),
            ..Profile::default()
        };
        let text = user_instruction(&draft(), &profile);
        assert!(text.contains("- Topic: Water cycle"));
        assert!(text.contains("- Subject: Geography"));
        assert!(text.contains("- Audience: Adult learners"));
        assert!(text.contains("- Style: Watercolor"));
        assert!(text.contains("Mascot") && text.contains("Charts"));
        assert!(text.contains("- User Content: \"Evaporation, condensation\""));
        assert!(!text.contains("CONTENT STANDARDS"));
        assert!(text.contains("- Teacher Context: Hoa, Geography."));
    }

    #[test]
    fn test_ai_suggested_content_adds_standards_and_hides_text() {
        let mut d = draft();
        d.key_content_mode = KeyContentMode::AiSuggested;
        d.features.clear();
        let text = user_instruction(&d, &Profile::default());
        assert!(text.contains("- Content Mode: AI suggests content"));
        assert!(text.contains("appropriate for the Adult learners level"));
        assert!(!text.contains("Evaporation"));
        assert!(text.contains("- Features: None"));
    }

    #[test]
    fn test_prompt_request_uses_text_model() {
        let config = Config::default();
        let request = prompt_request(&draft(), &Profile::default(), &config);
        assert_eq!(request.model, config.text_model);
        assert_eq!(request.temperature, Some(0.7));
        assert!(request.system_instruction.is_some());
    }

    #[test]
    fn test_image_request_rejects_blank_prompt() {
        assert!(matches!(
            image_request("   ", &Config::default()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_image_upload_from_data_url() {
        let upload = ImageUpload::from_data_url("data:image/jpeg;base64,/9j/4AAQ").unwrap();
        assert_eq!(upload.mime_type, "image/jpeg");
        assert_eq!(upload.data, "/9j/4AAQ");

        assert!(ImageUpload::from_data_url("not a data url").is_err());
        assert!(ImageUpload::from_data_url("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_image_upload_size_limit() {
        let big = vec![0u8; MAX_STYLE_IMAGE_BYTES + 1];
        assert!(ImageUpload::from_bytes("image/png", &big).is_err());
        let ok = ImageUpload::from_bytes("image/png", b"abc").unwrap();
        assert_eq!(ok.data, "YWJj");
    }
}

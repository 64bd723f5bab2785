//! Application configuration loaded from environment variables.
//!
//! Only deployment settings live here. API keys and the entitlement flag are
//! entered by the user and kept in local storage, never in the environment.

use crate::db::store::DEFAULT_QUOTA_BYTES;
use std::env;
use std::path::PathBuf;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the persisted records
    pub data_dir: PathBuf,
    /// Storage budget for all records together (bytes)
    pub storage_quota_bytes: usize,
    /// Gemini REST base URL (without version segment)
    pub gemini_base_url: String,
    /// Model used to write prompts
    pub text_model: String,
    /// Model used to render images
    pub image_model: String,
    /// Multimodal model used for style analysis and key checks
    pub vision_model: String,
    /// Temperature for prompt writing
    pub temperature: f32,
    /// Activation-code verification endpoint
    pub activation_url: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".edu-visual"),
            storage_quota_bytes: DEFAULT_QUOTA_BYTES,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            activation_url: "http://localhost:8080/activate".to_string(),
        }
    }
}

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TEXT_MODEL: &str = "gemini-3-pro-preview";
const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";
const DEFAULT_VISION_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TEMPERATURE: f32 = 0.7;

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every setting has a default except `ACTIVATION_URL`, which must point
    /// at the deployment's verification endpoint.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let data_dir = env::var("EDU_VISUAL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());

        let storage_quota_bytes = match env::var("STORAGE_QUOTA_BYTES") {
            Ok(v) => v
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("STORAGE_QUOTA_BYTES", v))?,
            Err(_) => DEFAULT_QUOTA_BYTES,
        };

        Ok(Self {
            data_dir,
            storage_quota_bytes,
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            text_model: env::var("GEMINI_TEXT_MODEL")
                .unwrap_or_else(|_| DEFAULT_TEXT_MODEL.to_string()),
            image_model: env::var("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string()),
            vision_model: env::var("GEMINI_VISION_MODEL")
                .unwrap_or_else(|_| DEFAULT_VISION_MODEL.to_string()),
            temperature: DEFAULT_TEMPERATURE,
            activation_url: env::var("ACTIVATION_URL")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("ACTIVATION_URL"))?,
        })
    }
}

/// `$HOME/.edu-visual`, or the working directory when there is no home.
fn default_data_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".edu-visual")
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("ACTIVATION_URL", " https://example.com/activate ");
        env::set_var("EDU_VISUAL_DATA_DIR", "/tmp/edu-visual-test");
        env::set_var("GEMINI_BASE_URL", "http://localhost:9999/");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.activation_url, "https://example.com/activate");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/edu-visual-test"));
        assert_eq!(config.gemini_base_url, "http://localhost:9999");
        assert_eq!(config.text_model, "gemini-3-pro-preview");
        assert_eq!(config.storage_quota_bytes, DEFAULT_QUOTA_BYTES);
    }
}

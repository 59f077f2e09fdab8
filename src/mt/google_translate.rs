//! Google Translate API v2 provider
//!
//! Backs the asynchronous translation fallback for phrases the static
//! dictionary does not cover.
//!
//! # Authentication
//!
//! The API key is read from `GOOGLE_TRANSLATE_API_KEY` by
//! [`GoogleTranslateProvider::from_env`].
//!
//! # Example
//!
//! ```ignore
//! use civic_i18n::mt::{GoogleTranslateProvider, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::from_env()?;
//!     let result = provider.translate("Report an issue", "en", "hi").await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, normalize_locale, validate_locale};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const API_KEY_VAR: &str = "GOOGLE_TRANSLATE_API_KEY";

const DEFAULT_BASE_URL: &str = "https://translation.googleapis.com/language/translate/v2";

#[derive(Deserialize)]
struct ApiResponse {
    data: ApiData,
}

#[derive(Deserialize)]
struct ApiData {
    translations: Vec<ApiTranslation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTranslation {
    translated_text: String,
}

/// Google Translate API v2 provider
#[derive(Clone)]
pub struct GoogleTranslateProvider {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslateProvider {
    /// Per-string limit of the API
    const MAX_CHARS_PER_STRING: usize = 30_000;

    pub fn new(api_key: String) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::ConfigError("API key cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn from_env() -> MtResult<Self> {
        let api_key = std::env::var(API_KEY_VAR).map_err(|_| {
            MtError::ConfigError(format!("{} environment variable not set", API_KEY_VAR))
        })?;

        Self::new(api_key)
    }

    /// Point the provider at another endpoint speaking the same protocol
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn check_length(text: &str) -> MtResult<()> {
        if text.len() > Self::MAX_CHARS_PER_STRING {
            return Err(MtError::TranslationError(format!(
                "Text exceeds maximum length of {} characters",
                Self::MAX_CHARS_PER_STRING
            )));
        }
        Ok(())
    }

    fn request_body(text: &str, source_locale: &str, target_locale: &str) -> serde_json::Value {
        json!({
            "q": text,
            "source": normalize_locale(source_locale),
            "target": normalize_locale(target_locale),
            "format": "text"
        })
    }

    /// One phrase per request
    async fn request(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        let url = format!("{}?key={}", self.base_url, self.api_key);
        let body = Self::request_body(text, source_locale, target_locale);

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(if status.is_client_error() {
                MtError::ConfigError(format!("API client error ({}): {}", status, error_text))
            } else {
                MtError::TranslationError(format!("API server error ({}): {}", status, error_text))
            });
        }

        let parsed: ApiResponse = response.json().await.map_err(|e| {
            MtError::TranslationError(format!("Failed to parse API response: {}", e))
        })?;

        parsed
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| MtError::TranslationError("Empty API response".to_string()))
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for GoogleTranslateProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if text.is_empty() {
            return Ok(String::new());
        }
        Self::check_length(text)?;

        self.request(text, source_locale, target_locale).await
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_empty_key() {
        match GoogleTranslateProvider::new("   ".to_string()) {
            Err(MtError::ConfigError(msg)) => assert!(msg.contains("empty")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_provider_name() {
        let provider = GoogleTranslateProvider::new("test-key".to_string()).unwrap();
        assert_eq!(provider.provider_name(), "Google Translate");
    }

    #[test]
    fn test_request_carries_one_phrase() {
        let body = GoogleTranslateProvider::request_body("Report an issue", "en-US", "hi");
        assert_eq!(body["q"], "Report an issue");
        assert_eq!(body["source"], "en");
        assert_eq!(body["target"], "hi");
        assert_eq!(body["format"], "text");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"data": {"translations": [
            {"translatedText": "Buscar", "detectedSourceLanguage": "en"}
        ]}}"#;
        let parsed: ApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.translations[0].translated_text, "Buscar");
    }

    #[tokio::test]
    async fn test_translate_empty_text() {
        let provider = GoogleTranslateProvider::new("test-key".to_string()).unwrap();
        assert_eq!(provider.translate("", "en", "es").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_translate_invalid_locale() {
        let provider = GoogleTranslateProvider::new("test-key".to_string()).unwrap();
        assert!(provider.translate("hello", "en", "invalid#code").await.is_err());
    }

    #[tokio::test]
    async fn test_translate_text_too_long() {
        let provider = GoogleTranslateProvider::new("test-key".to_string()).unwrap();
        let long_text = "x".repeat(GoogleTranslateProvider::MAX_CHARS_PER_STRING + 1);
        match provider.translate(&long_text, "en", "fr").await {
            Err(MtError::TranslationError(msg)) => assert!(msg.contains("exceeds maximum")),
            other => panic!("Expected TranslationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let provider = GoogleTranslateProvider::new("test-key".to_string())
            .unwrap()
            .with_base_url("http://127.0.0.1:9/translate");
        let result = provider.translate("Search", "en", "es").await;
        assert!(matches!(result, Err(MtError::NetworkError(_))));
    }

    #[test]
    fn test_debug_masks_key() {
        let provider = GoogleTranslateProvider::new("test-key".to_string()).unwrap();
        let debug_str = format!("{:?}", provider);
        assert!(debug_str.contains("***"));
        assert!(!debug_str.contains("test-key"));
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_real_api_translation() {
        if std::env::var(API_KEY_VAR).is_err() {
            eprintln!("Skipping: {} not set", API_KEY_VAR);
            return;
        }

        let provider = GoogleTranslateProvider::from_env().unwrap();
        let result = provider.translate("Communities", "en", "fr").await.unwrap();
        assert!(!result.is_empty());
    }
}

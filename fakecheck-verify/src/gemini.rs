//! Gemini generative-language API provider
//!
//! Sends the text inside an analysis prompt and reads back the JSON object
//! the model is asked to produce.
//!
//! # Authentication
//!
//! The provider loads the API key from the `GEMINI_API_KEY` environment
//! variable.
//!
//! # Example
//!
//! ```ignore
//! use fakecheck_verify::{Classifier, GeminiProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GeminiProvider::from_env()?;
//!     let analysis = provider.classify("A Terra é plana.").await?;
//!     println!("{} ({}%)", analysis.verdict(), analysis.score_percentage());
//!     Ok(())
//! }
//! ```

use crate::analysis::Analysis;
use crate::classifier::{Classifier, strip_code_fences};
use crate::error::{VerifyError, VerifyResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tracing::debug;

/// Header carrying the key, so it stays out of URLs
pub(crate) const API_KEY_HEADER: &str = "x-goog-api-key";

const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Gemini `generateContent` provider
#[derive(Clone)]
pub struct GeminiProvider {
    /// API key for authentication
    api_key: String,
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Full `generateContent` URL of the model
    endpoint: String,
}

impl GeminiProvider {
    /// Longest text accepted in a single prompt
    pub const MAX_TEXT_CHARS: usize = 10_000;

    pub fn new(api_key: String) -> VerifyResult<Self> {
        if api_key.trim().is_empty() {
            return Err(VerifyError::ConfigError("API key cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                VerifyError::NetworkError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            api_key,
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Create a provider from the `GEMINI_API_KEY` environment variable
    pub fn from_env() -> VerifyResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            VerifyError::ConfigError("GEMINI_API_KEY environment variable not set".to_string())
        })?;

        Self::new(api_key)
    }

    /// Use another model or a proxy
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// The analysis prompt for `text`, stamped with `now`
    pub fn build_prompt(text: &str, now: DateTime<Utc>) -> String {
        format!(
            r#"Analyze the following text in detail and assess whether it is true.
Your knowledge ends in 2022: for events after that, state this limitation clearly
and focus on the elements of the text that do not depend on the period. Answer in Portuguese.

Current date: {date}
Text to analyze: "{text}"

Return ONLY a valid JSON object with exactly this structure and no other text:
{{
  "score": [0-1],
  "confiabilidade": [0-1],
  "classificacao": ["Comprovadamente Verdadeiro", "Parcialmente Verdadeiro", "Não Verificável", "Provavelmente Falso", "Comprovadamente Falso"],
  "explicacao_score": "string",
  "elementos_verdadeiros": ["array"],
  "elementos_falsos": ["array"],
  "elementos_suspeitos": ["array"],
  "fontes_confiaveis": ["array"],
  "indicadores_desinformacao": ["array"],
  "analise_detalhada": "string",
  "recomendacoes": ["array"],
  "limitacao_temporal": {{
    "afeta_analise": boolean,
    "elementos_nao_verificaveis": ["array"],
    "sugestoes_verificacao": ["array"]
  }}
}}"#,
            date = now.to_rfc3339(),
            text = text
        )
    }

    /// Request body for a prompt; low temperature keeps replies close to the schema
    pub fn request_body(prompt: &str) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.1,
                "topP": 0.1,
                "topK": 16,
                "maxOutputTokens": 2048
            }
        })
    }

    /// Text of the first candidate in a `generateContent` response
    pub fn extract_reply(response: &Value) -> VerifyResult<&str> {
        response["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                VerifyError::ApiError(
                    "Invalid API response: missing 'candidates[0].content.parts[0].text'"
                        .to_string(),
                )
            })
    }

    /// Parse the model reply, tolerating Markdown fences around the JSON
    pub fn parse_analysis(reply: &str) -> VerifyResult<Analysis> {
        serde_json::from_str(strip_code_fences(reply))
            .map_err(|e| VerifyError::ParseError(format!("Model reply is not an analysis: {}", e)))
    }
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"***")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl Classifier for GeminiProvider {
    async fn classify(&self, text: &str) -> VerifyResult<Analysis> {
        if text.trim().is_empty() {
            return Err(VerifyError::InvalidInput(vec!["Text is empty".to_string()]));
        }
        if text.chars().count() > Self::MAX_TEXT_CHARS {
            return Err(VerifyError::InvalidInput(vec![format!(
                "Text exceeds maximum length of {} characters",
                Self::MAX_TEXT_CHARS
            )]));
        }

        let body = Self::request_body(&Self::build_prompt(text, Utc::now()));

        debug!("Sending analysis request to {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(if status.is_client_error() {
                VerifyError::ConfigError(format!("API client error ({}): {}", status, error_text))
            } else {
                VerifyError::ApiError(format!("API server error ({}): {}", status, error_text))
            });
        }

        let json: Value = response.json().await.map_err(|e| {
            VerifyError::ApiError(format!("Failed to parse API response: {}", e))
        })?;

        Self::parse_analysis(Self::extract_reply(&json)?)
    }

    fn provider_name(&self) -> &str {
        "Gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Classification;
    use chrono::TimeZone;

    // ========== Initialization Tests ==========

    #[test]
    fn test_new_with_valid_key() {
        let provider = GeminiProvider::new("test-api-key".to_string()).unwrap();
        assert_eq!(provider.provider_name(), "Gemini");
    }

    #[test]
    fn test_new_with_empty_key() {
        match GeminiProvider::new("   ".to_string()) {
            Err(VerifyError::ConfigError(msg)) => assert!(msg.contains("empty")),
            _ => panic!("Expected ConfigError"),
        }
    }

    #[test]
    fn test_debug_masks_key() {
        let provider = GeminiProvider::new("secret-key".to_string()).unwrap();
        let debug_str = format!("{:?}", provider);
        assert!(debug_str.contains("***"));
        assert!(!debug_str.contains("secret-key"));
    }

    // ========== Request Tests ==========

    #[test]
    fn test_prompt_contains_text_and_date() {
        let now = Utc.with_ymd_and_hms(2025, 7, 20, 12, 0, 0).unwrap();
        let prompt = GeminiProvider::build_prompt("O céu é verde", now);
        assert!(prompt.contains("\"O céu é verde\""));
        assert!(prompt.contains("2025-07-20T12:00:00+00:00"));
        assert!(prompt.contains("\"limitacao_temporal\": {"));
    }

    #[test]
    fn test_request_body_generation_config() {
        let body = GeminiProvider::request_body("prompt");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(body["generationConfig"]["topK"], 16);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
    }

    // ========== Response Tests ==========

    #[test]
    fn test_extract_and_parse_fenced_reply() {
        let response = json!({
            "candidates": [{
                "content": {"parts": [{"text": "```json\n{\"score\": 0.9, \"classificacao\": \"Comprovadamente Verdadeiro\"}\n```"}]}
            }]
        });
        let reply = GeminiProvider::extract_reply(&response).unwrap();
        let analysis = GeminiProvider::parse_analysis(reply).unwrap();
        assert_eq!(analysis.verdict(), Classification::ProvenTrue);
    }

    #[test]
    fn test_extract_reply_missing_candidates() {
        assert!(matches!(
            GeminiProvider::extract_reply(&json!({"promptFeedback": {}})),
            Err(VerifyError::ApiError(_))
        ));
        assert!(GeminiProvider::extract_reply(&json!({
            "candidates": [{"content": {"parts": [{"text": "   "}]}}]
        }))
        .is_err());
    }

    #[test]
    fn test_parse_non_json_reply() {
        assert!(matches!(
            GeminiProvider::parse_analysis("I cannot help with that."),
            Err(VerifyError::ParseError(_))
        ));
    }

    // ========== Validation Tests ==========

    #[tokio::test]
    async fn test_classify_empty_text() {
        let provider = GeminiProvider::new("test-key".to_string()).unwrap();
        assert!(matches!(
            provider.classify("  ").await,
            Err(VerifyError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_classify_text_too_long() {
        let provider = GeminiProvider::new("test-key".to_string()).unwrap();
        let long_text = "x".repeat(GeminiProvider::MAX_TEXT_CHARS + 1);
        assert!(provider.classify(&long_text).await.is_err());
    }

    #[tokio::test]
    async fn test_network_error_hides_key() {
        let provider = GeminiProvider::new("SUPERSECRETKEY".to_string())
            .unwrap()
            .with_endpoint("http://127.0.0.1:1/v1beta/models/x:generateContent");
        let err = provider
            .classify("A água ferve a 100 graus.")
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::NetworkError(_)));
        assert!(!err.to_string().contains("SUPERSECRETKEY"));
    }

    // ========== Integration Tests (require real API key) ==========

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored
    async fn test_real_api_classification() {
        if std::env::var("GEMINI_API_KEY").is_err() {
            eprintln!("Skipping: GEMINI_API_KEY not set");
            return;
        }

        let provider = GeminiProvider::from_env().unwrap();
        let analysis = provider
            .classify("A água ferve a 100 graus Celsius ao nível do mar.")
            .await
            .unwrap();
        println!("{} ({}%)", analysis.verdict(), analysis.score_percentage());
        assert!((0.0..=1.0).contains(&analysis.score));
    }
}

//! Gemini Provider - Implementation of CompletionProvider for the Google
//! Generative Language API.
//!
//! Supports chat completions over the `generateContent` endpoint and
//! structured field extraction via JSON response mode with a response
//! schema.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-2.0-flash-exp")
//!     .with_temperature(0.7);
//!
//! let provider = GeminiProvider::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::conversation::{MessageRecord, Role};
use crate::domain::record::{extraction_schema, RecordPatch};
use crate::ports::{
    CompletionError, CompletionProvider, CompletionRequest, CompletionResponse, ExtractionRequest,
    FinishReason, ProviderInfo, TokenUsage,
};

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "gemini-2.0-flash-exp").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Default sampling temperature.
    pub temperature: f32,
    /// Default maximum output tokens.
    pub max_tokens: u32,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gemini-2.0-flash-exp".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            temperature: 0.7,
            max_tokens: 2048,
            timeout: Duration::from_secs(60),
            max_retries: 3,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the default temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the default maximum output tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider with the given configuration.
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the generateContent endpoint URL.
    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    /// Converts the ordered message log to Gemini's request format.
    ///
    /// Gemini carries system text in a dedicated `systemInstruction` slot,
    /// so system entries are concatenated there in log order; user and
    /// assistant turns become `user`/`model` contents.
    fn to_gemini_request(
        &self,
        messages: &[MessageRecord],
        temperature: f32,
        max_tokens: u32,
        response_schema: Option<serde_json::Value>,
    ) -> GenerateContentRequest {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for message in messages {
            match message.role() {
                Role::System => system_parts.push(Part {
                    text: message.content().to_string(),
                }),
                Role::User => contents.push(Content {
                    role: Some("user".to_string()),
                    parts: vec![Part {
                        text: message.content().to_string(),
                    }],
                }),
                Role::Assistant => contents.push(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part {
                        text: message.content().to_string(),
                    }],
                }),
            }
        }

        let system_instruction = if system_parts.is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: system_parts,
            })
        };

        let (response_mime_type, response_schema) = match response_schema {
            Some(schema) => (Some("application/json".to_string()), Some(schema)),
            None => (None, None),
        };

        GenerateContentRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: max_tokens,
                response_mime_type,
                response_schema,
            },
        }
    }

    /// Sends a request, retrying transient failures with backoff.
    async fn send_with_retries(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, CompletionError> {
        let mut last_error = CompletionError::Network("No attempts made".to_string());

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                sleep(Duration::from_millis(500 * 2u64.pow(attempt - 1))).await;
            }

            match self.send_once(body).await {
                Ok(response) => return Ok(response),
                Err(error) if error.is_retryable() && attempt < self.config.max_retries => {
                    tracing::debug!(%error, attempt, "gemini request failed; retrying");
                    last_error = error;
                }
                Err(error) => return Err(error),
            }
        }

        Err(last_error)
    }

    async fn send_once(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, CompletionError> {
        let response = self
            .client
            .post(self.generate_url())
            .query(&[("key", self.config.api_key())])
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    CompletionError::Network(format!("Connection failed: {}", e))
                } else {
                    CompletionError::Network(e.to_string())
                }
            })?;

        let response = self.handle_response_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| CompletionError::Parse(format!("Failed to parse response: {}", e)))
    }

    /// Classifies non-success statuses into completion errors.
    async fn handle_response_status(
        &self,
        response: Response,
    ) -> Result<Response, CompletionError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(CompletionError::AuthenticationFailed),
            429 => Err(CompletionError::RateLimited {
                retry_after_secs: 30,
            }),
            400 => Err(CompletionError::InvalidRequest(error_body)),
            500..=599 => Err(CompletionError::Unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(CompletionError::Network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Extracts the first candidate's concatenated text.
    fn candidate_text(response: &GenerateContentResponse) -> Result<String, CompletionError> {
        let candidate = response
            .candidates
            .first()
            .ok_or_else(|| CompletionError::Parse("Response contains no candidates".to_string()))?;

        let parts = candidate
            .content
            .as_ref()
            .and_then(|c| c.parts.as_ref())
            .ok_or_else(|| CompletionError::Parse("Candidate contains no content".to_string()))?;

        Ok(parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(""))
    }

    fn finish_reason(response: &GenerateContentResponse) -> FinishReason {
        match response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("PROHIBITED_CONTENT") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        }
    }

    fn usage(response: &GenerateContentResponse) -> TokenUsage {
        match &response.usage_metadata {
            Some(usage) => TokenUsage::new(usage.prompt_token_count, usage.candidates_token_count),
            None => TokenUsage::zero(),
        }
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let body = self.to_gemini_request(
            &request.messages,
            request.temperature.unwrap_or(self.config.temperature),
            request.max_tokens.unwrap_or(self.config.max_tokens),
            None,
        );

        let response = self.send_with_retries(&body).await?;
        let content = Self::candidate_text(&response)?;

        Ok(CompletionResponse {
            content,
            model: self.config.model.clone(),
            usage: Self::usage(&response),
            finish_reason: Self::finish_reason(&response),
        })
    }

    async fn extract_record(
        &self,
        request: ExtractionRequest,
    ) -> Result<RecordPatch, CompletionError> {
        // The transcript is framed as a single user turn under the
        // extraction instruction; extraction output should not depend on
        // chat history role alternation rules.
        let transcript = request
            .messages
            .iter()
            .map(|m| {
                let speaker = match m.role() {
                    Role::System => "system",
                    Role::User => "therapist",
                    Role::Assistant => "mentor",
                };
                format!("{}: {}", speaker, m.content())
            })
            .collect::<Vec<_>>()
            .join("\n");

        let framed = vec![
            MessageRecord::system(request.instruction.as_str())
                .map_err(|e| CompletionError::InvalidRequest(e.to_string()))?,
            MessageRecord::user(transcript)
                .map_err(|e| CompletionError::InvalidRequest(e.to_string()))?,
        ];

        // Deterministic, schema-constrained output.
        let body = self.to_gemini_request(&framed, 0.0, self.config.max_tokens, Some(extraction_schema()));

        let response = self.send_with_retries(&body).await?;
        let text = Self::candidate_text(&response)?;

        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| CompletionError::Parse(format!("Extraction output is not JSON: {}", e)))?;

        Ok(RecordPatch::from_json(&value))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", self.config.model.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiProvider {
        GeminiProvider::new(GeminiConfig::new("test-key"))
    }

    fn log() -> Vec<MessageRecord> {
        vec![
            MessageRecord::system("Base prompt").unwrap(),
            MessageRecord::system("Intake instructions").unwrap(),
            MessageRecord::user("Hello").unwrap(),
            MessageRecord::assistant("Hi, tell me about the case.").unwrap(),
        ]
    }

    #[test]
    fn system_messages_fold_into_system_instruction() {
        let request = provider().to_gemini_request(&log(), 0.7, 1024, None);

        let instruction = request.system_instruction.unwrap();
        assert_eq!(instruction.parts.len(), 2);
        assert_eq!(instruction.parts[0].text, "Base prompt");
        assert_eq!(instruction.parts[1].text, "Intake instructions");

        assert_eq!(request.contents.len(), 2);
        assert_eq!(request.contents[0].role.as_deref(), Some("user"));
        assert_eq!(request.contents[1].role.as_deref(), Some("model"));
    }

    #[test]
    fn request_serializes_to_camel_case() {
        let request = provider().to_gemini_request(&log(), 0.7, 1024, None);
        let json = serde_json::to_value(&request).unwrap();

        assert!(json.get("systemInstruction").is_some());
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
        assert!(json["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn schema_request_enables_json_mode() {
        let request =
            provider().to_gemini_request(&log(), 0.0, 1024, Some(extraction_schema()));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(json["generationConfig"]["responseSchema"]["properties"]
            .get("patient_age")
            .is_some());
    }

    #[test]
    fn candidate_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "Hello "}, {"text": "there"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3}
        }))
        .unwrap();

        assert_eq!(
            GeminiProvider::candidate_text(&response).unwrap(),
            "Hello there"
        );
        assert_eq!(
            GeminiProvider::usage(&response),
            TokenUsage::new(12, 3)
        );
        assert_eq!(GeminiProvider::finish_reason(&response), FinishReason::Stop);
    }

    #[test]
    fn empty_candidates_is_a_parse_error() {
        let response: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({"candidates": []})).unwrap();
        assert!(matches!(
            GeminiProvider::candidate_text(&response),
            Err(CompletionError::Parse(_))
        ));
    }

    #[test]
    fn max_tokens_maps_to_length_finish() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "truncated"}]},
                "finishReason": "MAX_TOKENS"
            }]
        }))
        .unwrap();
        assert_eq!(
            GeminiProvider::finish_reason(&response),
            FinishReason::Length
        );
    }

    #[test]
    fn provider_info_reports_model() {
        let info = provider().provider_info();
        assert_eq!(info.name, "gemini");
        assert_eq!(info.model, "gemini-2.0-flash-exp");
    }
}

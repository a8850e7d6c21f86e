//! Completion provider port - interface to the language-model service.
//!
//! Covers both capabilities the engine needs: free-text chat completion
//! over an ordered role-tagged message list, and structured extraction of
//! case-record fields from a transcript.

use async_trait::async_trait;

use crate::domain::conversation::{prompts, MessageRecord};
use crate::domain::record::RecordPatch;

/// Port for completion-service interactions.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generates the next assistant turn for the given message sequence.
    ///
    /// The model conditions its behavior on the system instructions already
    /// present in the log; callers do not pass a phase flag.
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, CompletionError>;

    /// Extracts case-record fields from a transcript using the provider's
    /// structured-output capability. Every schema field is optional; the
    /// returned patch carries only the fields the model populated.
    async fn extract_record(
        &self,
        request: ExtractionRequest,
    ) -> Result<RecordPatch, CompletionError>;

    /// Provider name and active model identifier.
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for a chat completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Full ordered message log, system entries included.
    pub messages: Vec<MessageRecord>,
    /// Optional override of the provider's configured token limit.
    pub max_tokens: Option<u32>,
    /// Optional override of the provider's configured temperature.
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Creates a request for the given message log with provider defaults.
    pub fn new(messages: Vec<MessageRecord>) -> Self {
        Self {
            messages,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Request for structured field extraction.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// The user/assistant transcript, system scaffolding excluded.
    pub messages: Vec<MessageRecord>,
    /// The fixed extraction instruction.
    pub instruction: String,
}

impl ExtractionRequest {
    /// Creates an extraction request over the given transcript using the
    /// standard instruction.
    pub fn new(messages: Vec<MessageRecord>) -> Self {
        Self {
            messages,
            instruction: prompts::EXTRACTION_INSTRUCTIONS.to_string(),
        }
    }
}

/// Response from a chat completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated assistant text.
    pub content: String,
    /// Model that generated the response.
    pub model: String,
    /// Token usage for observability.
    pub usage: TokenUsage,
    /// Why the model stopped generating.
    pub finish_reason: FinishReason,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Creates new token usage.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Creates zero usage.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// Natural stop.
    Stop,
    /// Hit the token limit.
    Length,
    /// Content was filtered for safety.
    ContentFilter,
}

/// Provider name and model identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
}

impl ProviderInfo {
    /// Creates new provider info.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Completion-service errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompletionError {
    /// Rate limited by the provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The provider rejected the request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Provider is unavailable.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Network error during the request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse the provider response, including structured output
    /// that does not validate against the extraction schema.
    #[error("parse error: {0}")]
    Parse(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl CompletionError {
    /// Returns true if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited { .. }
                | CompletionError::Unavailable(_)
                | CompletionError::Network(_)
                | CompletionError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::Role;

    #[test]
    fn completion_request_builder_works() {
        let request = CompletionRequest::new(vec![MessageRecord::user("Hello").unwrap()])
            .with_max_tokens(512)
            .with_temperature(0.3);

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role(), Role::User);
        assert_eq!(request.max_tokens, Some(512));
        assert_eq!(request.temperature, Some(0.3));
    }

    #[test]
    fn extraction_request_uses_standard_instruction() {
        let request = ExtractionRequest::new(Vec::new());
        assert_eq!(request.instruction, prompts::EXTRACTION_INSTRUCTIONS);
    }

    #[test]
    fn token_usage_calculates_total() {
        let usage = TokenUsage::new(100, 40);
        assert_eq!(usage.total_tokens, 140);
        assert_eq!(TokenUsage::zero().total_tokens, 0);
    }

    #[test]
    fn retryable_classification() {
        assert!(CompletionError::RateLimited { retry_after_secs: 30 }.is_retryable());
        assert!(CompletionError::Unavailable("down".into()).is_retryable());
        assert!(CompletionError::Network("reset".into()).is_retryable());
        assert!(CompletionError::Timeout { timeout_secs: 60 }.is_retryable());

        assert!(!CompletionError::AuthenticationFailed.is_retryable());
        assert!(!CompletionError::InvalidRequest("bad".into()).is_retryable());
        assert!(!CompletionError::Parse("bad json".into()).is_retryable());
    }

    #[test]
    fn errors_display_correctly() {
        assert_eq!(
            CompletionError::RateLimited { retry_after_secs: 30 }.to_string(),
            "rate limited: retry after 30s"
        );
        assert_eq!(
            CompletionError::Timeout { timeout_secs: 60 }.to_string(),
            "request timed out after 60s"
        );
    }
}

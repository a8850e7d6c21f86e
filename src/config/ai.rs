//! Completion-service configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Completion-service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Google API key
    pub google_api_key: Option<String>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum output tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on transient failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.google_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate completion-service configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("GOOGLE_API_KEY"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_require_api_key() {
        let config = AiConfig::default();
        assert_eq!(config.model, "gemini-2.0-flash-exp");
        assert_eq!(config.temperature, 0.7);
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("GOOGLE_API_KEY"))
        ));
    }

    #[test]
    fn key_makes_config_valid() {
        let config = AiConfig {
            google_api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn empty_key_is_missing() {
        let config = AiConfig {
            google_api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(!config.has_api_key());
        assert!(config.validate().is_err());
    }
}

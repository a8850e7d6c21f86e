//! Similarity-search configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Similarity-search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Base URL of the vector-store server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Reference collection name
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Embedding model identifier
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Number of references to retrieve per transition
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl RetrievalConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate retrieval configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidRetrievalUrl);
        }
        if self.top_k == 0 {
            return Err(ValidationError::InvalidTopK);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            collection: default_collection(),
            embedding_model: default_embedding_model(),
            top_k: default_top_k(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_collection() -> String {
    "case_references".to_string()
}

fn default_embedding_model() -> String {
    "models/embedding-001".to_string()
}

fn default_top_k() -> usize {
    2
}

fn default_timeout() -> u64 {
    30
}

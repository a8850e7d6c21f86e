//! Similarity-search port - interface to the reference-retrieval service.

use async_trait::async_trait;
use std::collections::HashMap;

/// Port for nearest-neighbor document retrieval.
///
/// Implementations own embedding and index lookup; callers provide only
/// the query text and the result count.
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    /// Returns up to `k` documents ordered from most to least similar.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>, RetrievalError>;
}

/// A raw search hit as returned by the collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    /// Full document text.
    pub content: String,
    /// Provider metadata; expected to contain at least `id` and `title`.
    pub metadata: HashMap<String, String>,
    /// Similarity score. The convention (distance vs. similarity, sign) is
    /// provider-defined.
    pub score: f32,
}

impl ScoredDocument {
    /// Creates a document with the given metadata entries.
    pub fn new(content: impl Into<String>, score: f32) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
            score,
        }
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Similarity-search errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RetrievalError {
    /// The reference collection does not exist or is empty.
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    /// Embedding the query text failed.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Network error during the request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse the search response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

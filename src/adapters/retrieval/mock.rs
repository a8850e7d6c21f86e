//! Mock similarity search for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{RetrievalError, ScoredDocument, SimilaritySearch};

/// Mock similarity search over a fixed corpus.
///
/// Queued errors are served before documents, so a test can script "fail
/// once, then succeed". Calls are recorded for verification.
#[derive(Clone, Default)]
pub struct MockSimilaritySearch {
    documents: Vec<ScoredDocument>,
    errors: Arc<Mutex<VecDeque<RetrievalError>>>,
    calls: Arc<Mutex<Vec<(String, usize)>>>,
}

impl MockSimilaritySearch {
    /// Creates an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document with `id` and `title` metadata.
    pub fn with_document(
        mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        score: f32,
    ) -> Self {
        self.documents.push(
            ScoredDocument::new(content, score)
                .with_metadata("id", id)
                .with_metadata("title", title),
        );
        self
    }

    /// Adds a document as-is, metadata untouched.
    pub fn with_raw_document(mut self, document: ScoredDocument) -> Self {
        self.documents.push(document);
        self
    }

    /// Queues an error to serve before any documents.
    pub fn with_error(self, error: RetrievalError) -> Self {
        self.errors.lock().unwrap().push_back(error);
        self
    }

    /// The (query, k) pairs received so far.
    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SimilaritySearch for MockSimilaritySearch {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>, RetrievalError> {
        self.calls.lock().unwrap().push((query.to_string(), k));

        if let Some(error) = self.errors.lock().unwrap().pop_front() {
            return Err(error);
        }

        Ok(self.documents.iter().take(k).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_at_most_k_documents() {
        let search = MockSimilaritySearch::new()
            .with_document("a", "A", "text a", 0.1)
            .with_document("b", "B", "text b", 0.2)
            .with_document("c", "C", "text c", 0.3);

        let hits = search.search("query", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].metadata.get("id"), Some(&"a".to_string()));
    }

    #[tokio::test]
    async fn serves_errors_before_documents() {
        let search = MockSimilaritySearch::new()
            .with_document("a", "A", "text", 0.1)
            .with_error(RetrievalError::Network("down".into()));

        assert!(search.search("q", 1).await.is_err());
        assert!(search.search("q", 1).await.is_ok());
    }

    #[tokio::test]
    async fn records_calls() {
        let search = MockSimilaritySearch::new();
        search.search("first", 2).await.unwrap();
        search.search("second", 3).await.unwrap();

        assert_eq!(
            search.calls(),
            vec![("first".to_string(), 2), ("second".to_string(), 3)]
        );
    }
}

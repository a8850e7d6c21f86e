//! Retrieval orchestration: turns a case summary into reference cases.

use std::sync::Arc;

use crate::domain::session::RetrievedReference;
use crate::ports::{RetrievalError, ScoredDocument, SimilaritySearch};

/// Default identifier when a hit carries no `id` metadata.
const UNKNOWN_ID: &str = "unknown";

/// Default title when a hit carries no `title` metadata.
const UNTITLED: &str = "Untitled Reference";

/// Fetches the top-K reference cases for a case summary.
///
/// Embedding and nearest-neighbor search belong to the collaborator behind
/// [`SimilaritySearch`]; this component constructs nothing but the call and
/// normalizes the hits into [`RetrievedReference`] values. Each transition
/// performs exactly one retrieval call.
#[derive(Clone)]
pub struct RetrievalOrchestrator {
    search: Arc<dyn SimilaritySearch>,
    top_k: usize,
}

impl RetrievalOrchestrator {
    /// Creates an orchestrator retrieving `top_k` references per call.
    pub fn new(search: Arc<dyn SimilaritySearch>, top_k: usize) -> Self {
        Self { search, top_k }
    }

    /// Retrieves and normalizes the references for the given summary.
    pub async fn retrieve(&self, summary: &str) -> Result<Vec<RetrievedReference>, RetrievalError> {
        let documents = self.search.search(summary, self.top_k).await?;

        tracing::debug!(
            requested = self.top_k,
            returned = documents.len(),
            "reference retrieval completed"
        );

        Ok(documents.into_iter().map(normalize).collect())
    }
}

fn normalize(document: ScoredDocument) -> RetrievedReference {
    let id = document
        .metadata
        .get("id")
        .cloned()
        .unwrap_or_else(|| UNKNOWN_ID.to_string());
    let title = document
        .metadata
        .get("title")
        .cloned()
        .unwrap_or_else(|| UNTITLED.to_string());

    RetrievedReference {
        id,
        title,
        content: document.content,
        score: document.score,
    }
}

//! Chroma Search - Implementation of SimilaritySearch against the Chroma
//! HTTP API.
//!
//! The query text is embedded with [`GeminiEmbeddings`] and the resulting
//! vector is posted to the collection's query endpoint. Chroma reports
//! distances, so lower scores mean more similar documents.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::ports::{RetrievalError, ScoredDocument, SimilaritySearch};

use super::embeddings::GeminiEmbeddings;

/// Configuration for the Chroma search adapter.
#[derive(Debug, Clone)]
pub struct ChromaConfig {
    /// Base URL of the Chroma server (e.g., "http://localhost:8000").
    pub base_url: String,
    /// Name of the reference collection.
    pub collection: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl ChromaConfig {
    /// Creates a configuration for the given server and collection.
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            collection: collection.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Chroma-backed similarity search.
pub struct ChromaSearch {
    config: ChromaConfig,
    client: Client,
    embeddings: GeminiEmbeddings,
    /// Collection id, resolved from the collection name on first use.
    collection_id: OnceCell<String>,
}

impl ChromaSearch {
    /// Creates a search adapter over the given embeddings client.
    pub fn new(config: ChromaConfig, embeddings: GeminiEmbeddings) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            embeddings,
            collection_id: OnceCell::new(),
        }
    }

    /// Resolves and caches the collection id for the configured name.
    async fn collection_id(&self) -> Result<&str, RetrievalError> {
        self.collection_id
            .get_or_try_init(|| async {
                let url = format!(
                    "{}/api/v1/collections/{}",
                    self.config.base_url, self.config.collection
                );

                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| RetrievalError::Network(e.to_string()))?;

                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(RetrievalError::CollectionNotFound(
                        self.config.collection.clone(),
                    ));
                }
                if !response.status().is_success() {
                    return Err(RetrievalError::Network(format!(
                        "collection lookup failed with {}",
                        response.status()
                    )));
                }

                let info: CollectionInfo = response
                    .json()
                    .await
                    .map_err(|e| RetrievalError::Parse(e.to_string()))?;

                Ok(info.id)
            })
            .await
            .map(String::as_str)
    }
}

#[async_trait]
impl SimilaritySearch for ChromaSearch {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>, RetrievalError> {
        let collection_id = self.collection_id().await?;
        let embedding = self.embeddings.embed(query).await?;

        let url = format!(
            "{}/api/v1/collections/{}/query",
            self.config.base_url, collection_id
        );

        let body = QueryRequest {
            query_embeddings: vec![embedding],
            n_results: k,
            include: vec!["documents", "metadatas", "distances"],
        };

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RetrievalError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else {
                    RetrievalError::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Network(format!(
                "query failed with {}: {}",
                status, body
            )));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::Parse(e.to_string()))?;

        Ok(parsed.into_documents())
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Debug, Serialize)]
struct QueryRequest {
    query_embeddings: Vec<Vec<f32>>,
    n_results: usize,
    include: Vec<&'static str>,
}

/// Chroma returns column-parallel lists, one row per query embedding.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<HashMap<String, serde_json::Value>>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f32>>>,
}

impl QueryResponse {
    /// Zips the first result row into scored documents, preserving rank
    /// order.
    fn into_documents(self) -> Vec<ScoredDocument> {
        let ids = self.ids.into_iter().next().unwrap_or_default();
        let documents = self
            .documents
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default();
        let metadatas = self
            .metadatas
            .and_then(|m| m.into_iter().next())
            .unwrap_or_default();
        let distances = self
            .distances
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default();

        ids.into_iter()
            .enumerate()
            .map(|(i, id)| {
                let content = documents
                    .get(i)
                    .and_then(|d| d.clone())
                    .unwrap_or_default();
                let mut metadata: HashMap<String, String> = metadatas
                    .get(i)
                    .and_then(|m| m.clone())
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(key, value)| {
                        let value = match value {
                            serde_json::Value::String(s) => s,
                            other => other.to_string(),
                        };
                        (key, value)
                    })
                    .collect();
                // Chroma's document id doubles as the reference id when the
                // metadata does not carry one.
                metadata.entry("id".to_string()).or_insert(id);
                let score = distances.get(i).copied().unwrap_or(0.0);

                ScoredDocument {
                    content,
                    metadata,
                    score,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_request_serializes_expected_shape() {
        let body = QueryRequest {
            query_embeddings: vec![vec![0.1, 0.2]],
            n_results: 2,
            include: vec!["documents", "metadatas", "distances"],
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["n_results"], 2);
        assert_eq!(json["query_embeddings"][0][1], 0.2);
        assert_eq!(json["include"][0], "documents");
    }

    #[test]
    fn response_zips_columns_in_rank_order() {
        let response: QueryResponse = serde_json::from_value(serde_json::json!({
            "ids": [["doc-1", "doc-2"]],
            "documents": [["First text", "Second text"]],
            "metadatas": [[{"id": "case-1", "title": "School refusal"}, {"title": "Silent teen"}]],
            "distances": [[0.12, 0.48]]
        }))
        .unwrap();

        let documents = response.into_documents();
        assert_eq!(documents.len(), 2);

        assert_eq!(documents[0].content, "First text");
        assert_eq!(documents[0].metadata.get("id"), Some(&"case-1".to_string()));
        assert_eq!(documents[0].score, 0.12);

        // Missing metadata id falls back to the document id.
        assert_eq!(documents[1].metadata.get("id"), Some(&"doc-2".to_string()));
        assert_eq!(
            documents[1].metadata.get("title"),
            Some(&"Silent teen".to_string())
        );
        assert_eq!(documents[1].score, 0.48);
    }

    #[test]
    fn non_string_metadata_values_are_stringified() {
        let response: QueryResponse = serde_json::from_value(serde_json::json!({
            "ids": [["doc-1"]],
            "documents": [["Text"]],
            "metadatas": [[{"id": "case-1", "year": 2021}]],
            "distances": [[0.3]]
        }))
        .unwrap();

        let documents = response.into_documents();
        assert_eq!(documents[0].metadata.get("year"), Some(&"2021".to_string()));
    }

    #[test]
    fn empty_response_yields_no_documents() {
        let response: QueryResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(response.into_documents().is_empty());
    }
}

//! Text embeddings via the Google Generative Language API.

use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::RetrievalError;

/// Client for the `embedContent` endpoint.
#[derive(Clone)]
pub struct GeminiEmbeddings {
    api_key: Secret<String>,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiEmbeddings {
    /// Creates an embeddings client for the given API key and model
    /// (e.g., "models/embedding-001").
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key: Secret::new(api_key.into()),
            model: model.into(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            client,
        }
    }

    /// Overrides the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Embeds the given text into a vector.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let url = format!("{}/v1beta/{}:embedContent", self.base_url, self.model);

        let body = EmbedContentRequest {
            model: self.model.clone(),
            content: EmbedContent {
                parts: vec![EmbedPart {
                    text: text.to_string(),
                }],
            },
        };

        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.expose_secret().as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Embedding(format!(
                "embedContent failed with {}: {}",
                status, body
            )));
        }

        let parsed: EmbedContentResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::Parse(e.to_string()))?;

        Ok(parsed.embedding.values)
    }
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest {
    model: String,
    content: EmbedContent,
}

#[derive(Debug, Serialize)]
struct EmbedContent {
    parts: Vec<EmbedPart>,
}

#[derive(Debug, Serialize)]
struct EmbedPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: Embedding,
}

#[derive(Debug, Deserialize)]
struct Embedding {
    values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_shape_matches_api() {
        let body = EmbedContentRequest {
            model: "models/embedding-001".to_string(),
            content: EmbedContent {
                parts: vec![EmbedPart {
                    text: "case summary".to_string(),
                }],
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "models/embedding-001");
        assert_eq!(json["content"]["parts"][0]["text"], "case summary");
    }

    #[test]
    fn response_parses_embedding_values() {
        let parsed: EmbedContentResponse =
            serde_json::from_str(r#"{"embedding":{"values":[0.1,0.2,0.3]}}"#).unwrap();
        assert_eq!(parsed.embedding.values, vec![0.1, 0.2, 0.3]);
    }
}

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::ProviderSettings;
use crate::error::FaqError;
use crate::llm::{resolve_endpoint, truncate};

/// Text to fixed-dimension vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Dimensionality every returned vector must have.
    fn dimensions(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, FaqError>;
}

/// Reject vectors of the wrong size or with non-finite components.
pub fn validate_embedding(embedding: &[f32], dimensions: usize) -> Result<(), FaqError> {
    if embedding.len() != dimensions {
        return Err(FaqError::Embedding(format!(
            "expected {} dimensions, got {}",
            dimensions,
            embedding.len()
        )));
    }
    if embedding.iter().any(|x| !x.is_finite()) {
        return Err(FaqError::Embedding(
            "embedding contains non-finite values".to_string(),
        ));
    }
    Ok(())
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// OpenAI-compatible `/embeddings` client.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
    api_key: String,
}

impl OpenAiEmbedder {
    pub fn new(client: reqwest::Client, settings: &ProviderSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.clone(),
            model: settings.embedding_model.clone(),
            dimensions: settings.embedding_dimensions,
            api_key: settings.api_key.clone(),
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, FaqError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": text.replace('\n', " "),
            "dimensions": self.dimensions,
        });

        let resp = self
            .client
            .post(resolve_endpoint(&self.base_url, "embeddings"))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| FaqError::Embedding(format!("embedding request failed: {}", e)))?;

        let status = resp.status();
        let text_body = resp
            .text()
            .await
            .map_err(|e| FaqError::Embedding(format!("failed to read embedding response: {}", e)))?;
        if !status.is_success() {
            return Err(FaqError::Embedding(format!(
                "embedding provider returned {}: {}",
                status,
                truncate(&text_body, 300)
            )));
        }

        let parsed: EmbeddingResponse = serde_json::from_str(&text_body)
            .map_err(|e| FaqError::Embedding(format!("malformed embedding response: {}", e)))?;
        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| FaqError::Embedding("embedding response had no data".to_string()))?;

        validate_embedding(&embedding, self.dimensions)?;
        debug!(model = %self.model, dims = embedding.len(), "query embedded");
        Ok(embedding)
    }
}

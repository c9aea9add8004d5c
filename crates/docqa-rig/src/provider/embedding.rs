//! Ollama embedding provider.

use std::time::Duration;

use docqa_core::{EmbeddingProvider, Error, Result, ServiceHealth};
use rig::embeddings::EmbeddingModel as _;
use rig::providers::ollama;
use url::Url;

use super::{TRACING_TARGET, health};

/// Embeds text with an Ollama-served embedding model.
#[derive(Clone)]
pub struct OllamaEmbedding {
    model: ollama::EmbeddingModel<reqwest::Client>,
    model_name: String,
    dimensions: usize,
    timeout: Duration,
    http: reqwest::Client,
    base_url: Url,
}

impl OllamaEmbedding {
    pub(crate) fn new(
        client: ollama::Client,
        http: reqwest::Client,
        base_url: Url,
        model_name: &str,
        dimensions: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            model: ollama::EmbeddingModel::new(client, model_name, dimensions),
            model_name: model_name.to_string(),
            dimensions,
            timeout,
            http,
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaEmbedding {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let embeddings = tokio::time::timeout(self.timeout, self.model.embed_texts(texts))
            .await
            .map_err(|_| {
                Error::timeout().with_message(format!(
                    "embedding model '{}' did not answer within {}s",
                    self.model_name,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                tracing::warn!(
                    target: TRACING_TARGET,
                    model = %self.model_name,
                    error = %e,
                    "embedding request failed"
                );
                Error::network_error()
                    .with_message(format!("embedding model '{}' failed: {e}", self.model_name))
            })?;

        Ok(embeddings
            .into_iter()
            .map(|embedding| embedding.vec.into_iter().map(|x| x as f32).collect())
            .collect())
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        Ok(health::check_model(&self.http, &self.base_url, &self.model_name).await)
    }
}

impl std::fmt::Debug for OllamaEmbedding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaEmbedding")
            .field("model", &self.model_name)
            .field("ndims", &self.dimensions)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

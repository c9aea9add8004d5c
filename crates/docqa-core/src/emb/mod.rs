//! Embedding backend abstraction.
//!
//! An [`EmbeddingProvider`] turns text into fixed-dimension vectors. The
//! [`EmbeddingService`] wraps one provider behind an `Arc` so the same model
//! instance can be injected into both the index build and the query paths.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::{Error, Result, ServiceHealth};

/// Tracing target for embedding operations.
pub const TRACING_TARGET: &str = "docqa_core::emb";

/// Core trait for embedding backends.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier of the embedding model.
    fn model_name(&self) -> &str;

    /// Number of dimensions every produced vector has.
    fn dimensions(&self) -> usize;

    /// Embeds a batch of texts, returning one vector per input in order.
    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Verifies that the backend is reachable.
    async fn health_check(&self) -> Result<ServiceHealth>;
}

/// Cheaply cloneable handle to an embedding provider.
#[derive(Clone)]
pub struct EmbeddingService {
    inner: Arc<dyn EmbeddingProvider>,
}

impl EmbeddingService {
    /// Wraps a provider.
    pub fn new<P>(provider: P) -> Self
    where
        P: EmbeddingProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Identifier of the embedding model.
    pub fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    /// Number of dimensions every produced vector has.
    pub fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    /// Embeds a batch of texts and checks that the backend returned one
    /// vector per input.
    pub async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let expected = texts.len();
        let started = Instant::now();

        tracing::trace!(
            target: TRACING_TARGET,
            model = self.model_name(),
            count = expected,
            "embedding batch"
        );

        let vectors = self.inner.embed_texts(texts).await?;
        if vectors.len() != expected {
            return Err(Error::invalid_response().with_message(format!(
                "expected {expected} embeddings, backend returned {}",
                vectors.len()
            )));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            model = self.model_name(),
            count = expected,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "embedded batch"
        );

        Ok(vectors)
    }

    /// Embeds a single text.
    pub async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_texts(vec![text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::invalid_response().with_message("backend returned no embedding"))
    }

    /// Verifies that the backend is reachable.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        self.inner.health_check().await
    }
}

impl fmt::Debug for EmbeddingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingService")
            .field("model", &self.model_name())
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

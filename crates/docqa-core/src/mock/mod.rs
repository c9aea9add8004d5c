//! Mock implementations of backend providers for testing.
//!
//! [`MockProvider`] implements both [`EmbeddingProvider`] and
//! [`CompletionProvider`]. Embeddings are deterministic bag-of-words vectors:
//! every lowercase alphanumeric token is hashed into one of
//! `embedding_dimensions` buckets, so texts sharing words score higher than
//! texts that do not.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! docqa-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_core::mock::{MockConfig, MockProvider};
//!
//! let provider = MockProvider::with_response("The sky is blue.");
//! let failing = MockProvider::new(MockConfig {
//!     fail_completions: true,
//!     ..Default::default()
//! });
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sha2::{Digest, Sha256};

use crate::{
    CompletionProvider, CompletionRequest, CompletionService, EmbeddingProvider, EmbeddingService,
    Error, Result, ServiceHealth,
};

/// Configuration for the mock provider.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Dimensions of mock embedding vectors.
    pub embedding_dimensions: usize,
    /// Model name reported by the embedder.
    pub embedding_model: String,
    /// Response returned for completion requests.
    pub mock_response: Option<String>,
    /// Makes every embedding call fail with a network error.
    pub fail_embeddings: bool,
    /// Makes every completion call fail with a network error.
    pub fail_completions: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            embedding_dimensions: 128,
            embedding_model: "mock-embedding".to_string(),
            mock_response: None,
            fail_embeddings: false,
            fail_completions: false,
        }
    }
}

/// Unified mock provider for testing.
#[derive(Clone, Debug)]
pub struct MockProvider {
    config: Arc<MockConfig>,
    prompts: Arc<AtomicUsize>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(MockConfig::default())
    }
}

impl MockProvider {
    /// Creates a new mock provider with the given configuration.
    pub fn new(config: MockConfig) -> Self {
        Self {
            config: Arc::new(config),
            prompts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a new mock provider with a fixed completion response.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self::new(MockConfig {
            mock_response: Some(response.into()),
            ..Default::default()
        })
    }

    /// Number of completion requests received so far.
    pub fn completion_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    /// Wraps clones of this provider into the two service handles.
    pub fn into_services(self) -> (EmbeddingService, CompletionService) {
        (EmbeddingService::new(self.clone()), CompletionService::new(self))
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let dims = self.config.embedding_dimensions;
        let mut vector = vec![0.0_f32; dims];
        let tokens = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty());

        for token in tokens {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            let mut bucket = [0_u8; 8];
            bucket.copy_from_slice(&digest[..8]);
            let index = (u64::from_le_bytes(bucket) % dims as u64) as usize;
            vector[index] += 1.0;
        }

        vector
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn model_name(&self) -> &str {
        &self.config.embedding_model
    }

    fn dimensions(&self) -> usize {
        self.config.embedding_dimensions
    }

    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if self.config.fail_embeddings {
            return Err(Error::network_error().with_message("mock embedding backend is down"));
        }

        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        if self.config.fail_embeddings {
            return Ok(ServiceHealth::unhealthy("mock embedding backend is down"));
        }
        Ok(ServiceHealth::healthy())
    }
}

#[async_trait::async_trait]
impl CompletionProvider for MockProvider {
    fn model_name(&self) -> &str {
        "mock-completion"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.prompts.fetch_add(1, Ordering::SeqCst);

        if self.config.fail_completions {
            return Err(Error::network_error().with_message("mock completion backend is down"));
        }

        Ok(self
            .config
            .mock_response
            .clone()
            .unwrap_or_else(|| format!("Mock answer for a {}-character prompt", request.prompt.len())))
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        if self.config.fail_completions {
            return Ok(ServiceHealth::unhealthy("mock completion backend is down"));
        }
        Ok(ServiceHealth::healthy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn embeddings_are_deterministic() -> Result<()> {
        let embedder = EmbeddingService::new(MockProvider::default());
        let first = embedder.embed_text("The sky is blue.").await?;
        let second = embedder.embed_text("the SKY is blue").await?;
        assert_eq!(first, second);
        assert_eq!(first.len(), 128);
        Ok(())
    }

    #[tokio::test]
    async fn shared_words_score_higher() -> Result<()> {
        let embedder = EmbeddingService::new(MockProvider::default());
        let query = embedder.embed_text("What color is the sky?").await?;
        let related = embedder.embed_text("The sky is blue.").await?;
        let unrelated = embedder.embed_text("Quarterly revenue grew").await?;
        assert!(dot(&query, &related) > dot(&query, &unrelated));
        Ok(())
    }

    #[tokio::test]
    async fn failures_are_configurable() {
        let provider = MockProvider::new(MockConfig {
            fail_completions: true,
            ..Default::default()
        });
        let (embedder, completer) = provider.clone().into_services();

        assert!(embedder.embed_text("ok").await.is_ok());
        let error = completer
            .complete(&CompletionRequest::new("prompt", 0.2, 16))
            .await
            .unwrap_err();
        assert!(error.is_unavailable());
        assert_eq!(provider.completion_count(), 1);
    }
}

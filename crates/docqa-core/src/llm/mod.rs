//! Language model backend abstraction.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::{Result, ServiceHealth};

/// Tracing target for completion operations.
pub const TRACING_TARGET: &str = "docqa_core::llm";

/// A single prompt to complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The fully rendered prompt.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Upper bound on generated tokens.
    pub max_tokens: u64,
}

impl CompletionRequest {
    /// Creates a new request.
    pub fn new(prompt: impl Into<String>, temperature: f64, max_tokens: u64) -> Self {
        Self {
            prompt: prompt.into(),
            temperature,
            max_tokens,
        }
    }
}

/// Core trait for text generation backends.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Identifier of the language model.
    fn model_name(&self) -> &str;

    /// Generates text for the given request.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Verifies that the backend is reachable.
    async fn health_check(&self) -> Result<ServiceHealth>;
}

/// Cheaply cloneable handle to a completion provider.
#[derive(Clone)]
pub struct CompletionService {
    inner: Arc<dyn CompletionProvider>,
}

impl CompletionService {
    /// Wraps a provider.
    pub fn new<P>(provider: P) -> Self
    where
        P: CompletionProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Identifier of the language model.
    pub fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    /// Generates text for the given request.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let started = Instant::now();
        let output = self.inner.complete(request).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            model = self.model_name(),
            prompt_chars = request.prompt.len(),
            output_chars = output.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "completion finished"
        );

        Ok(output)
    }

    /// Verifies that the backend is reachable.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        self.inner.health_check().await
    }
}

impl fmt::Debug for CompletionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionService")
            .field("model", &self.model_name())
            .finish()
    }
}

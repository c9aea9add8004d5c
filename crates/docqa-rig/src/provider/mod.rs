//! Ollama-backed embedding and completion providers.
//!
//! Both providers share one `rig` Ollama client and one `reqwest` client
//! for health probes. [`connect`] builds them from an [`OllamaConfig`]
//! and wraps them in the service handles the pipeline consumes.

mod completion;
mod embedding;
mod health;

use docqa_core::{CompletionService, EmbeddingService};
use rig::client::Nothing;
use rig::providers::ollama;

pub use self::completion::OllamaCompletion;
pub use self::embedding::OllamaEmbedding;
pub use self::health::{HEALTH_CHECK_TIMEOUT, check_model, has_model, list_models};
use crate::config::OllamaConfig;
use crate::{Error, Result};

/// Tracing target for provider operations.
pub const TRACING_TARGET: &str = "docqa_rig::provider";

/// Creates the embedding and completion services for the configured
/// Ollama daemon. No request is sent.
///
/// # Errors
///
/// Returns [`Error::Config`] if the URL is invalid or a client cannot be
/// built.
pub fn connect(config: &OllamaConfig) -> Result<(EmbeddingService, CompletionService)> {
    let base_url = config.base_url().map_err(Error::config)?;

    let client = ollama::Client::builder()
        .api_key(Nothing)
        .base_url(config.ollama_url.trim_end_matches('/'))
        .build()
        .map_err(|e| Error::config(format!("failed to create Ollama client: {e}")))?;

    let http = reqwest::Client::builder()
        .connect_timeout(HEALTH_CHECK_TIMEOUT)
        .build()
        .map_err(|e| Error::config(format!("failed to create HTTP client: {e}")))?;

    let embedding = OllamaEmbedding::new(
        client.clone(),
        http.clone(),
        base_url.clone(),
        &config.embedding_model,
        config.embedding_dimensions,
        config.timeout(),
    );
    let completion = OllamaCompletion::new(&client, http, base_url, &config.completion_model);

    tracing::debug!(
        target: TRACING_TARGET,
        url = %config.ollama_url,
        embedding_model = %config.embedding_model,
        completion_model = %config.completion_model,
        "ollama providers created"
    );

    Ok((EmbeddingService::new(embedding), CompletionService::new(completion)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_uses_configured_models() -> Result<()> {
        let config = OllamaConfig::builder()
            .with_embedding_model("nomic-embed-text")
            .with_embedding_dimensions(768_usize)
            .build()
            .map_err(Error::config)?;

        let (embedder, completer) = connect(&config)?;
        assert_eq!(embedder.model_name(), "nomic-embed-text");
        assert_eq!(embedder.dimensions(), 768);
        assert_eq!(completer.model_name(), "llama3.2");
        Ok(())
    }

    #[test]
    fn connect_rejects_invalid_url() {
        let config = OllamaConfig {
            ollama_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(connect(&config), Err(Error::Config(_))));
    }
}

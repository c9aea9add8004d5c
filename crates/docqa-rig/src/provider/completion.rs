//! Ollama completion provider.

use docqa_core::{CompletionProvider, CompletionRequest, Error, Result, ServiceHealth};
use rig::completion::{AssistantContent, CompletionModel as _};
use rig::one_or_many::OneOrMany;
use rig::prelude::CompletionClient;
use rig::providers::ollama;
use url::Url;

use super::{TRACING_TARGET, health};

/// Generates answers with an Ollama-served language model.
#[derive(Clone)]
pub struct OllamaCompletion {
    model: ollama::CompletionModel,
    model_name: String,
    http: reqwest::Client,
    base_url: Url,
}

impl OllamaCompletion {
    pub(crate) fn new(
        client: &ollama::Client,
        http: reqwest::Client,
        base_url: Url,
        model_name: &str,
    ) -> Self {
        Self {
            model: client.completion_model(model_name),
            model_name: model_name.to_string(),
            http,
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OllamaCompletion {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let response = self
            .model
            .completion_request(request.prompt.as_str())
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            // Ollama caps output through `options.num_predict` only.
            .additional_params(serde_json::json!({ "num_predict": request.max_tokens }))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(
                    target: TRACING_TARGET,
                    model = %self.model_name,
                    error = %e,
                    "completion request failed"
                );
                Error::network_error()
                    .with_message(format!("language model '{}' failed: {e}", self.model_name))
            })?;

        Ok(extract_text_content(&response.choice))
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        Ok(health::check_model(&self.http, &self.base_url, &self.model_name).await)
    }
}

/// Concatenates the text parts of a model response.
fn extract_text_content(choice: &OneOrMany<AssistantContent>) -> String {
    choice
        .iter()
        .filter_map(|content| match content {
            AssistantContent::Text(text) => Some(text.text()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("")
}

impl std::fmt::Debug for OllamaCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaCompletion")
            .field("model", &self.model_name)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

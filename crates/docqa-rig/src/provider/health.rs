//! Reachability checks against the Ollama daemon.

use std::time::{Duration, Instant};

use docqa_core::ServiceHealth;
use serde::Deserialize;
use url::Url;

use super::TRACING_TARGET;

/// How long a health probe may take.
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Lists the models pulled into the daemon at `base_url`.
///
/// # Errors
///
/// Returns a message if the daemon is unreachable, answers with an error
/// status, or the response cannot be decoded.
pub async fn list_models(
    http: &reqwest::Client,
    base_url: &Url,
) -> std::result::Result<Vec<String>, String> {
    let url = base_url
        .join("/api/tags")
        .map_err(|e| format!("invalid health check URL: {e}"))?;

    let response = http
        .get(url.clone())
        .timeout(HEALTH_CHECK_TIMEOUT)
        .send()
        .await
        .map_err(|e| format!("cannot reach Ollama at {base_url}: {e}"))?;

    if !response.status().is_success() {
        return Err(format!(
            "Ollama at {base_url} answered {}",
            response.status()
        ));
    }

    let tags: TagsResponse = response
        .json()
        .await
        .map_err(|e| format!("unexpected response from {url}: {e}"))?;

    Ok(tags.models.into_iter().map(|m| m.name).collect())
}

/// Returns true if `model` is among `available`, accepting an implicit
/// `:latest` tag.
pub fn has_model(available: &[String], model: &str) -> bool {
    available.iter().any(|name| {
        name == model
            || name
                .strip_prefix(model)
                .is_some_and(|tag| tag.starts_with(':') && !model.contains(':'))
    })
}

/// Probes the daemon and reports whether `model` is available.
pub async fn check_model(http: &reqwest::Client, base_url: &Url, model: &str) -> ServiceHealth {
    let started = Instant::now();

    let health = match list_models(http, base_url).await {
        Ok(models) if has_model(&models, model) => ServiceHealth::healthy(),
        Ok(_) => ServiceHealth::unhealthy(format!(
            "model '{model}' is not available; run: ollama pull {model}"
        )),
        Err(message) => ServiceHealth::unhealthy(message),
    };

    tracing::debug!(
        target: TRACING_TARGET,
        model,
        healthy = health.is_healthy(),
        "health check finished"
    );

    health.with_response_time(started.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn model_matching() {
        let available = names(&["llama3.2:latest", "all-minilm:l6-v2"]);
        assert!(has_model(&available, "llama3.2"));
        assert!(has_model(&available, "llama3.2:latest"));
        assert!(has_model(&available, "all-minilm"));
        assert!(!has_model(&available, "llama3.2:1b"));
        assert!(!has_model(&available, "llama3"));
        assert!(!has_model(&[], "llama3.2"));
    }

    #[tokio::test]
    async fn unreachable_daemon_is_unhealthy() {
        let http = reqwest::Client::new();
        let url = Url::parse("http://127.0.0.1:9").expect("valid url");

        let health = check_model(&http, &url, "llama3.2").await;
        assert!(!health.is_healthy());
        assert!(health.message.is_some());
        assert!(health.response.is_some());
    }
}

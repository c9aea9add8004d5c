//! Backend health reporting.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use docqa_core::ServiceHealth;
use serde::{Deserialize, Serialize};

use super::TRACING_TARGET;
use crate::service::{QueryService, ServiceState};

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// True when both backends are reachable.
    pub is_healthy: bool,
    /// Embedding backend health.
    pub embedding: ServiceHealth,
    /// Language model backend health.
    pub completion: ServiceHealth,
    /// Collection the answers are retrieved from.
    pub collection: String,
    /// Number of indexed passages.
    pub passages: usize,
}

fn into_health(result: docqa_core::Result<ServiceHealth>) -> ServiceHealth {
    result.unwrap_or_else(|error| ServiceHealth::unhealthy(error.to_string()))
}

#[tracing::instrument(skip_all)]
async fn health_status(State(query): State<QueryService>) -> (StatusCode, Json<HealthResponse>) {
    let pipeline = query.pipeline();
    let (embedding, completion) = futures::join!(
        pipeline.store().embedder().health_check(),
        pipeline.completer().health_check(),
    );

    let embedding = into_health(embedding);
    let completion = into_health(completion);
    let is_healthy = embedding.is_healthy() && completion.is_healthy();

    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::info!(
        target: TRACING_TARGET,
        is_healthy = is_healthy,
        status_code = status_code.as_u16(),
        "health status response prepared"
    );

    let response = HealthResponse {
        is_healthy,
        embedding,
        completion,
        collection: pipeline.store().collection_name().to_string(),
        passages: pipeline.store().len(),
    };

    (status_code, Json(response))
}

/// Returns a [`Router`] with the health route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use docqa_core::mock::{MockConfig, MockProvider};

    use super::*;
    use crate::handler::test::{create_test_server, create_test_server_with_state, create_test_state};

    #[tokio::test]
    async fn healthy_backends() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        let response = server.get("/health").await;
        response.assert_status_ok();

        let body: HealthResponse = response.json();
        assert!(body.is_healthy);
        assert_eq!(body.collection, "document_qa_collection");
        assert_eq!(body.passages, 3);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_model_is_unavailable() -> anyhow::Result<()> {
        let provider = MockProvider::new(MockConfig {
            fail_completions: true,
            ..Default::default()
        });
        let server = create_test_server_with_state(create_test_state(provider, true).await?).await?;

        let response = server.get("/health").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        let body: HealthResponse = response.json();
        assert!(!body.is_healthy);
        assert!(body.embedding.is_healthy());
        assert!(!body.completion.is_healthy());
        Ok(())
    }
}

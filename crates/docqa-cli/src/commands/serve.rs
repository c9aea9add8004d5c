//! `docqa serve`: the interactive front end.

use anyhow::Context;
use axum::Router;
use docqa_core::{CompletionService, EmbeddingService};
use docqa_rig::RagConfig;
use docqa_server::handler::routes;
use docqa_server::middleware::{RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt};
use docqa_server::service::ServiceState;

use super::load_pipeline;
use crate::config::ServerConfig;
use crate::server::serve_http;

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Routes (innermost) - actual request handlers
pub fn create_router(state: ServiceState, recovery: &RecoveryConfig) -> Router {
    routes()
        .with_state(state)
        .with_observability()
        .with_recovery(recovery)
}

/// Loads the index and serves the question form until shutdown.
pub async fn serve(
    config: &RagConfig,
    embedder: EmbeddingService,
    completer: CompletionService,
    server: ServerConfig,
    recovery: &RecoveryConfig,
) -> anyhow::Result<()> {
    let pipeline = load_pipeline(config, embedder, completer).await?;
    let state = ServiceState::new(pipeline, &config.documents.documents_dir);
    let router = create_router(state, recovery);

    serve_http(router, server)
        .await
        .context("HTTP server failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use docqa_core::mock::MockProvider;
    use docqa_core::{Passage, PassageMetadata};
    use docqa_rig::{AnswerPipeline, VectorStore};

    use super::*;

    #[tokio::test]
    async fn router_serves_form_with_request_ids() -> anyhow::Result<()> {
        let config = RagConfig::default();
        let (embedder, completer) = MockProvider::with_response("The sky is blue.").into_services();

        let mut store = VectorStore::new(&config.store, embedder);
        let passage = Passage::new(
            "The sky is blue.",
            PassageMetadata {
                source_path: "data/documents/sky.pdf".to_string(),
                page_number: 1,
                chunk_sequence_id: 0,
            },
        );
        store.build(vec![passage], false).await?;
        let pipeline = AnswerPipeline::new(&config.pipeline, &config.ollama, store, completer)?;

        let router = create_router(
            ServiceState::new(pipeline, &config.documents.documents_dir),
            &RecoveryConfig::default(),
        );
        let server = TestServer::new(router)?;

        let response = server
            .post("/")
            .form(&[("question", "What color is the sky?"), ("show_sources", "on")])
            .await;
        response.assert_status_ok();
        assert!(!response.header("x-request-id").is_empty());
        assert!(response.text().contains("File: sky.pdf | Page: 1"));
        Ok(())
    }
}

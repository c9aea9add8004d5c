//! Subcommand implementations.

mod ask;
mod check;
mod delete;
mod ingest;
mod serve;

use anyhow::Context;
use docqa_core::{CompletionService, EmbeddingService};
use docqa_rig::{AnswerPipeline, RagConfig, VectorStore};

pub use self::ask::ask;
pub use self::check::check;
pub use self::delete::delete;
pub use self::ingest::ingest;
pub use self::serve::serve;
use crate::TRACING_TARGET_STARTUP;

/// Creates the Ollama-backed services.
pub fn connect(config: &RagConfig) -> anyhow::Result<(EmbeddingService, CompletionService)> {
    docqa_rig::provider::connect(&config.ollama).context("failed to create Ollama clients")
}

/// Loads the persisted collection and builds the answer pipeline.
async fn load_pipeline(
    config: &RagConfig,
    embedder: EmbeddingService,
    completer: CompletionService,
) -> anyhow::Result<AnswerPipeline> {
    let mut store = VectorStore::new(&config.store, embedder);
    let passages = store
        .load(&config.store.collection_name)
        .await
        .context("failed to load the document index, run `docqa ingest` first")?;

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        collection = %config.store.collection_name,
        passages,
        model = completer.model_name(),
        "answer pipeline ready"
    );

    AnswerPipeline::new(&config.pipeline, &config.ollama, store, completer)
        .context("failed to create the answer pipeline")
}

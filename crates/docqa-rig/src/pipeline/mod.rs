//! Retrieval-augmented answering.
//!
//! [`AnswerPipeline::query`] retrieves the top passages for a question,
//! joins them into a context block, fills the prompt template and asks the
//! language model for an answer.

mod prompt;
mod sources;

use docqa_core::{CompletionRequest, CompletionService, Passage};
use serde::{Deserialize, Serialize};

pub use self::prompt::{DEFAULT_PROMPT_TEMPLATE, PromptTemplate};
pub use self::sources::{NO_SOURCES, format_sources};
use crate::config::{OllamaConfig, PipelineConfig};
use crate::store::VectorStore;
use crate::{Error, Result};

/// Tracing target for answer generation.
pub const TRACING_TARGET: &str = "docqa_rig::pipeline";

/// Separator placed between passages in the context block.
const CONTEXT_SEPARATOR: &str = "\n\n";

/// The outcome of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// The question as asked.
    pub question: String,
    /// The language model's raw output.
    pub answer: String,
    /// The context block sent to the model.
    pub context: String,
    /// The passages behind the context, best match first.
    pub sources: Vec<Passage>,
}

impl AnswerRecord {
    /// Renders the sources for display.
    pub fn format_sources(&self) -> String {
        format_sources(&self.sources)
    }
}

/// Answers questions from an initialized [`VectorStore`].
#[derive(Debug)]
pub struct AnswerPipeline {
    store: VectorStore,
    completer: CompletionService,
    template: PromptTemplate,
    top_k: usize,
    temperature: f64,
    max_tokens: u64,
    timeout: std::time::Duration,
}

impl AnswerPipeline {
    /// Creates a pipeline over a built or loaded store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configured prompt template cannot be
    /// loaded.
    pub fn new(
        config: &PipelineConfig,
        ollama: &OllamaConfig,
        store: VectorStore,
        completer: CompletionService,
    ) -> Result<Self> {
        Ok(Self {
            template: config.prompt_template()?,
            store: store.with_min_score(config.similarity_threshold),
            completer,
            top_k: config.top_k,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: ollama.timeout(),
        })
    }

    /// The underlying vector store.
    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// The language model service.
    pub fn completer(&self) -> &CompletionService {
        &self.completer
    }

    /// Answers a question from the indexed documents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RetrievalUnavailable`] if the store is not
    /// initialized or the query cannot be embedded, and [`Error::Generation`]
    /// if the language model fails or times out.
    pub async fn query(&self, question: &str) -> Result<AnswerRecord> {
        let retrieved = self
            .store
            .retrieve(question, self.top_k)
            .await
            .map_err(Error::retrieval_unavailable)?;

        let sources: Vec<Passage> = retrieved.into_iter().map(|r| r.passage).collect();
        let context = sources
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);

        tracing::debug!(
            target: TRACING_TARGET,
            passages = sources.len(),
            context_chars = context.len(),
            "context assembled"
        );

        let prompt = self.template.render(&context, question);
        let request = CompletionRequest::new(prompt, self.temperature, self.max_tokens);

        let answer = tokio::time::timeout(self.timeout, self.completer.complete(&request))
            .await
            .map_err(|_| {
                Error::generation(format!(
                    "language model did not answer within {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(Error::generation)?;

        tracing::info!(
            target: TRACING_TARGET,
            sources = sources.len(),
            answer_chars = answer.len(),
            "question answered"
        );

        Ok(AnswerRecord {
            question: question.to_string(),
            answer,
            context,
            sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use docqa_core::mock::{MockConfig, MockProvider};
    use docqa_core::{CompletionProvider, EmbeddingService, ServiceHealth};

    use super::*;
    use crate::config::{DocumentConfig, StoreConfig};
    use crate::document::{DocumentProcessor, write_test_pdf};

    fn store_in(dir: &Path, embedder: EmbeddingService) -> VectorStore {
        let config = StoreConfig {
            index_dir: dir.to_path_buf(),
            ..Default::default()
        };
        VectorStore::new(&config, embedder)
    }

    fn pipeline(store: VectorStore, provider: MockProvider) -> AnswerPipeline {
        let (_, completer) = provider.into_services();
        AnswerPipeline::new(
            &PipelineConfig::default(),
            &OllamaConfig::default(),
            store,
            completer,
        )
        .expect("default config")
    }

    #[tokio::test]
    async fn answers_from_a_single_page_pdf() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let docs = dir.path().join("documents");
        std::fs::create_dir_all(&docs)?;
        write_test_pdf(&docs.join("sky.pdf"), &["The sky is blue."]);

        let passages = DocumentProcessor::new(&DocumentConfig::default())?
            .process(&docs)
            .await?;
        assert_eq!(passages.len(), 1);

        let provider = MockProvider::with_response("The sky is blue.");
        let (embedder, _) = provider.clone().into_services();
        let mut store = store_in(dir.path(), embedder);
        store.build(passages, true).await?;

        let record = pipeline(store, provider.clone())
            .query("What color is the sky?")
            .await?;

        assert_eq!(record.question, "What color is the sky?");
        assert_eq!(record.answer, "The sky is blue.");
        assert_eq!(record.context, "The sky is blue.");
        assert_eq!(record.sources.len(), 1);
        assert_eq!(record.sources[0].metadata.page_number, 1);
        assert_eq!(provider.completion_count(), 1);

        let rendered = record.format_sources();
        assert!(rendered.contains("sky.pdf"));
        assert!(rendered.contains("Page: 1"));
        assert!(rendered.contains("The sky is blue."));
        Ok(())
    }

    #[tokio::test]
    async fn context_joins_passages_in_rank_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let provider = MockProvider::default();
        let (embedder, _) = provider.clone().into_services();
        let mut store = store_in(dir.path(), embedder);
        store
            .build(
                vec![
                    Passage::new("Grass is green.", meta(0)),
                    Passage::new("The sky is blue.", meta(1)),
                ],
                false,
            )
            .await?;

        let record = pipeline(store, provider).query("What color is the sky?").await?;
        assert_eq!(record.context, "The sky is blue.\n\nGrass is green.");
        assert!(record.answer.starts_with("Mock answer for a"));
        Ok(())
    }

    #[tokio::test]
    async fn uninitialized_store_is_retrieval_unavailable() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let provider = MockProvider::default();
        let (embedder, _) = provider.clone().into_services();

        let error = pipeline(store_in(dir.path(), embedder), provider.clone())
            .query("anything")
            .await
            .unwrap_err();

        assert!(matches!(error, Error::RetrievalUnavailable(_)));
        assert!(error.is_recoverable());
        assert_eq!(provider.completion_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn backend_failure_is_generation_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let provider = MockProvider::new(MockConfig {
            fail_completions: true,
            ..Default::default()
        });
        let (embedder, _) = provider.clone().into_services();
        let mut store = store_in(dir.path(), embedder);
        store.build(vec![Passage::new("The sky is blue.", meta(0))], false).await?;

        let error = pipeline(store, provider).query("sky").await.unwrap_err();
        assert!(matches!(error, Error::Generation(_)));
        Ok(())
    }

    struct StalledModel;

    #[async_trait::async_trait]
    impl CompletionProvider for StalledModel {
        fn model_name(&self) -> &str {
            "stalled"
        }

        async fn complete(&self, _request: &CompletionRequest) -> docqa_core::Result<String> {
            std::future::pending().await
        }

        async fn health_check(&self) -> docqa_core::Result<ServiceHealth> {
            Ok(ServiceHealth::healthy())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_model_times_out() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (embedder, _) = MockProvider::default().into_services();
        let mut store = store_in(dir.path(), embedder);
        store.build(vec![Passage::new("The sky is blue.", meta(0))], false).await?;

        let ollama = OllamaConfig {
            timeout_secs: 5,
            ..Default::default()
        };
        let pipeline = AnswerPipeline::new(
            &PipelineConfig::default(),
            &ollama,
            store,
            CompletionService::new(StalledModel),
        )?;

        let error = pipeline.query("sky").await.unwrap_err();
        assert!(matches!(error, Error::Generation(message) if message.contains("5s")));
        Ok(())
    }

    fn meta(seq: u64) -> docqa_core::PassageMetadata {
        docqa_core::PassageMetadata {
            source_path: "docs/facts.pdf".to_string(),
            page_number: 1,
            chunk_sequence_id: seq,
        }
    }
}

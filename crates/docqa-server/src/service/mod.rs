//! Application state and dependency injection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use docqa_rig::{AnswerPipeline, AnswerRecord};
use tokio::sync::Mutex;

/// Static details shown in the information panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    /// Directory the documents were ingested from.
    pub documents_dir: PathBuf,
    /// Language model answering questions.
    pub model: String,
    /// Collection the answers are retrieved from.
    pub collection: String,
}

impl SystemInfo {
    /// Collects the panel details from a pipeline.
    pub fn new(documents_dir: impl AsRef<Path>, pipeline: &AnswerPipeline) -> Self {
        Self {
            documents_dir: documents_dir.as_ref().to_path_buf(),
            model: pipeline.completer().model_name().to_string(),
            collection: pipeline.store().collection_name().to_string(),
        }
    }
}

/// Serializes questions so exactly one is processed at a time.
#[derive(Debug, Clone)]
pub struct QueryService {
    pipeline: Arc<AnswerPipeline>,
    gate: Arc<Mutex<()>>,
}

impl QueryService {
    /// Wraps a ready pipeline.
    pub fn new(pipeline: AnswerPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// The wrapped pipeline.
    pub fn pipeline(&self) -> &AnswerPipeline {
        &self.pipeline
    }

    /// Answers a question, waiting for any question already in progress.
    pub async fn ask(&self, question: &str) -> docqa_rig::Result<AnswerRecord> {
        let _processing = self.gate.lock().await;
        self.pipeline.query(question).await
    }
}

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub query: QueryService,
    pub info: Arc<SystemInfo>,
}

impl ServiceState {
    /// Creates the state from a ready pipeline.
    pub fn new(pipeline: AnswerPipeline, documents_dir: impl AsRef<Path>) -> Self {
        let info = SystemInfo::new(documents_dir, &pipeline);
        Self {
            query: QueryService::new(pipeline),
            info: Arc::new(info),
        }
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(query: QueryService);
impl_di!(info: Arc<SystemInfo>);

#[cfg(test)]
mod tests {
    use docqa_core::mock::MockProvider;

    use crate::handler::test::create_test_state;

    #[tokio::test]
    async fn concurrent_questions_are_all_answered() -> anyhow::Result<()> {
        let provider = MockProvider::with_response("The sky is blue.");
        let state = create_test_state(provider.clone(), true).await?;

        let (first, second) = futures::join!(
            state.query.ask("What color is the sky?"),
            state.query.ask("What color is grass?"),
        );
        assert_eq!(first?.answer, "The sky is blue.");
        assert_eq!(second?.answer, "The sky is blue.");
        assert_eq!(provider.completion_count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn system_info_describes_the_pipeline() -> anyhow::Result<()> {
        let state = create_test_state(MockProvider::default(), true).await?;
        assert_eq!(state.info.model, "mock-completion");
        assert_eq!(state.info.collection, "document_qa_collection");
        assert_eq!(state.info.documents_dir.to_str(), Some("data/documents"));
        Ok(())
    }
}

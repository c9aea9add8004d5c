//! `docqa ingest`: build the persistent index.

use anyhow::Context;
use docqa_core::EmbeddingService;
use docqa_rig::{DocumentProcessor, Error, RagConfig, VectorStore};

use crate::TRACING_TARGET_COMMAND;

/// Printed when there is nothing to index.
pub const NO_DOCUMENTS_HINT: &str = "No documents found. Please add PDF files to:";

/// Processes every PDF and persists the collection.
///
/// Returns the number of indexed passages, or `None` when the documents
/// directory holds no PDF with extractable text.
pub async fn run_ingestion(
    config: &RagConfig,
    embedder: EmbeddingService,
) -> anyhow::Result<Option<usize>> {
    let documents_dir = &config.documents.documents_dir;
    std::fs::create_dir_all(documents_dir)
        .with_context(|| format!("failed to create {}", documents_dir.display()))?;
    std::fs::create_dir_all(&config.store.index_dir)
        .with_context(|| format!("failed to create {}", config.store.index_dir.display()))?;

    let processor = DocumentProcessor::new(&config.documents)?;
    let passages = match processor.process(documents_dir).await {
        Ok(passages) if passages.is_empty() => return Ok(None),
        Ok(passages) => passages,
        Err(Error::NoDocumentsFound(_)) => return Ok(None),
        Err(error) => return Err(error).context("failed to process documents"),
    };

    let mut store = VectorStore::new(&config.store, embedder);
    let indexed = store
        .build(passages, true)
        .await
        .context("failed to build the document index")?;

    Ok(Some(indexed))
}

/// Runs ingestion and reports the result.
pub async fn ingest(config: &RagConfig, embedder: EmbeddingService) -> anyhow::Result<()> {
    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        documents_dir = %config.documents.documents_dir.display(),
        "starting ingestion"
    );

    let Some(indexed) = run_ingestion(config, embedder).await? else {
        println!(
            "{NO_DOCUMENTS_HINT} {}",
            config.documents.documents_dir.display()
        );
        anyhow::bail!("nothing to ingest");
    };

    println!("Indexed {indexed} document chunks");
    println!("Vector store saved to: {}", config.store.index_path().display());
    println!("You can now run: docqa serve");
    Ok(())
}

#[cfg(test)]
mod tests {
    use docqa_core::mock::MockProvider;
    use docqa_rig::{DocumentConfig, StoreConfig};

    use super::*;

    fn config_in(root: &std::path::Path) -> RagConfig {
        RagConfig {
            documents: DocumentConfig {
                documents_dir: root.join("documents"),
                ..Default::default()
            },
            store: StoreConfig {
                index_dir: root.join("vectorstore"),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn missing_documents_creates_directories() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = config_in(dir.path());
        let (embedder, _) = MockProvider::default().into_services();

        assert_eq!(run_ingestion(&config, embedder.clone()).await?, None);
        assert!(config.documents.documents_dir.is_dir());
        assert!(config.store.index_dir.is_dir());
        assert!(!config.store.index_path().exists());

        assert!(ingest(&config, embedder).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_pdf_fails_ingestion() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = config_in(dir.path());
        std::fs::create_dir_all(&config.documents.documents_dir)?;
        std::fs::write(config.documents.documents_dir.join("broken.pdf"), b"not a pdf")?;
        let (embedder, _) = MockProvider::default().into_services();

        let error = run_ingestion(&config, embedder).await.unwrap_err();
        assert!(error.to_string().contains("failed to process documents"));
        Ok(())
    }
}

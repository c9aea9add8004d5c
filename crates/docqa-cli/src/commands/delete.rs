//! `docqa delete`: remove the persisted collection.

use docqa_core::EmbeddingService;
use docqa_rig::{RagConfig, VectorStore};

/// Deletes the configured collection.
pub async fn delete(config: &RagConfig, embedder: EmbeddingService) -> anyhow::Result<()> {
    let mut store = VectorStore::new(&config.store, embedder);
    let name = config.store.collection_name.as_str();

    if store.delete_collection().await? {
        println!("Collection '{name}' deleted");
    } else {
        println!("Collection '{name}' does not exist");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use docqa_core::mock::MockProvider;
    use docqa_rig::StoreConfig;

    use super::*;

    #[tokio::test]
    async fn deleting_a_missing_collection_succeeds() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = RagConfig {
            store: StoreConfig {
                index_dir: dir.path().to_path_buf(),
                ..Default::default()
            },
            ..Default::default()
        };
        let (embedder, _) = MockProvider::default().into_services();

        delete(&config, embedder).await?;
        assert!(!config.store.index_path().exists());
        Ok(())
    }
}

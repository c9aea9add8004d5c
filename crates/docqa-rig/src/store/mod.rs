//! Vector store over embedded passages.
//!
//! [`VectorStore`] embeds passages with the injected [`EmbeddingService`],
//! keeps unit-length vectors in memory for brute-force cosine search, and
//! persists collections to a SQLite file through [`SqliteIndex`].
//!
//! The store starts uninitialized; [`VectorStore::build`] or
//! [`VectorStore::load`] must succeed before [`VectorStore::retrieve`] can
//! be called.

mod sqlite;

use std::path::Path;

use docqa_core::{EmbeddingService, Passage, ScoredPassage};
use jiff::Timestamp;

pub use self::sqlite::{CollectionInfo, SqliteIndex, StoredEntry};
use crate::config::StoreConfig;
use crate::{Error, Result};

/// Tracing target for vector store operations.
pub const TRACING_TARGET: &str = "docqa_rig::store";

/// In-memory contents of the active collection.
#[derive(Debug)]
struct Collection {
    info: CollectionInfo,
    entries: Vec<StoredEntry>,
}

/// Builds, loads, queries and deletes a named collection of passages.
#[derive(Debug)]
pub struct VectorStore {
    embedder: EmbeddingService,
    index: SqliteIndex,
    collection_name: String,
    batch_size: usize,
    min_score: Option<f32>,
    active: Option<Collection>,
}

impl VectorStore {
    /// Creates an uninitialized store for the configured collection.
    pub fn new(config: &StoreConfig, embedder: EmbeddingService) -> Self {
        Self {
            embedder,
            index: SqliteIndex::new(config.index_path()),
            collection_name: config.collection_name.clone(),
            batch_size: config.embedding_batch_size.max(1),
            min_score: None,
            active: None,
        }
    }

    /// Drops retrieved passages scoring below `min_score`.
    pub fn with_min_score(mut self, min_score: Option<f32>) -> Self {
        self.min_score = min_score;
        self
    }

    /// Name of the managed collection.
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Path of the index database.
    pub fn index_path(&self) -> &Path {
        self.index.path()
    }

    /// The embedding service used for passages and queries.
    pub fn embedder(&self) -> &EmbeddingService {
        &self.embedder
    }

    /// Returns true once `build` or `load` has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.active.is_some()
    }

    /// Number of passages in the active collection.
    pub fn len(&self) -> usize {
        self.active.as_ref().map_or(0, |c| c.entries.len())
    }

    /// Returns true if no passages are loaded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embeds every passage and makes the result the active collection.
    ///
    /// With `persist` set, the collection replaces any persisted collection
    /// of the same name in a single transaction. On failure the previously
    /// active collection stays in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Embedding`] if the backend fails or returns a vector
    /// of the wrong size, a non-finite value or a zero vector.
    pub async fn build(&mut self, passages: Vec<Passage>, persist: bool) -> Result<usize> {
        let dimensions = self.embedder.dimensions();
        let mut entries = Vec::with_capacity(passages.len());

        tracing::info!(
            target: TRACING_TARGET,
            collection = %self.collection_name,
            passages = passages.len(),
            model = self.embedder.model_name(),
            "building collection"
        );

        for batch in passages.chunks(self.batch_size) {
            let texts = batch.iter().map(|p| p.content.clone()).collect();
            let vectors = self
                .embedder
                .embed_texts(texts)
                .await
                .map_err(|e| Error::embedding(format!("failed to embed passages: {e}")))?;

            for (passage, vector) in batch.iter().zip(vectors) {
                let vector = normalize(vector, dimensions).map_err(|reason| {
                    Error::embedding(format!(
                        "passage {} from {}: {reason}",
                        passage.metadata.chunk_sequence_id, passage.metadata.source_path
                    ))
                })?;
                entries.push(StoredEntry::new(passage.clone(), vector));
            }

            tracing::debug!(
                target: TRACING_TARGET,
                embedded = entries.len(),
                total = passages.len(),
                "embedded batch"
            );
        }

        let info = CollectionInfo {
            name: self.collection_name.clone(),
            embedding_model: self.embedder.model_name().to_string(),
            dimensions,
            created_at: Timestamp::now(),
        };

        let collection = if persist {
            let index = self.index.clone();
            tokio::task::spawn_blocking(move || {
                index.replace_collection(&info, &entries)?;
                Ok::<_, Error>(Collection { info, entries })
            })
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))??
        } else {
            Collection { info, entries }
        };

        let count = collection.entries.len();
        tracing::info!(
            target: TRACING_TARGET,
            collection = %self.collection_name,
            passages = count,
            persisted = persist,
            "collection ready"
        );

        self.active = Some(collection);
        Ok(count)
    }

    /// Attaches to a persisted collection without recomputing embeddings.
    ///
    /// On success the loaded collection becomes the managed one, so a later
    /// [`VectorStore::delete_collection`] removes it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CollectionNotFound`] if nothing was persisted under
    /// `collection_name`, or [`Error::EmbeddingModelMismatch`] if it was
    /// built with a different embedding model or dimensionality.
    pub async fn load(&mut self, collection_name: &str) -> Result<usize> {
        let index = self.index.clone();
        let name = collection_name.to_string();
        let model = self.embedder.model_name().to_string();
        let dimensions = self.embedder.dimensions();

        let collection = tokio::task::spawn_blocking(move || -> Result<Collection> {
            let info = index
                .collection_info(&name)?
                .ok_or_else(|| Error::CollectionNotFound(name.clone()))?;

            if info.embedding_model != model || info.dimensions != dimensions {
                return Err(Error::EmbeddingModelMismatch {
                    collection: name,
                    stored_model: info.embedding_model,
                    stored_dimensions: info.dimensions,
                    model,
                    dimensions,
                });
            }

            let entries = index.load_entries(&info.name, info.dimensions)?;
            Ok(Collection { info, entries })
        })
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))??;

        let count = collection.entries.len();
        self.collection_name = collection.info.name.clone();
        tracing::info!(
            target: TRACING_TARGET,
            collection = %self.collection_name,
            passages = count,
            created_at = %collection.info.created_at,
            "collection loaded"
        );

        self.active = Some(collection);
        Ok(count)
    }

    /// Returns the `k` passages most similar to `query`, best first.
    ///
    /// Ties keep insertion order. A configured minimum score removes weaker
    /// matches after ranking.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before `build` or `load`, and
    /// [`Error::Embedding`] if the query cannot be embedded.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredPassage>> {
        let collection = self.active.as_ref().ok_or(Error::NotInitialized)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let vector = self
            .embedder
            .embed_text(query)
            .await
            .map_err(|e| Error::embedding(format!("failed to embed query: {e}")))?;
        let query_vector = normalize(vector, collection.info.dimensions)
            .map_err(|reason| Error::embedding(format!("query: {reason}")))?;

        let mut scored: Vec<(usize, f32)> = collection
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, dot(&query_vector, &entry.embedding)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let results: Vec<ScoredPassage> = scored
            .into_iter()
            .filter(|(_, score)| self.min_score.is_none_or(|min| *score >= min))
            .take(k)
            .map(|(i, score)| ScoredPassage {
                passage: collection.entries[i].passage.clone(),
                score,
            })
            .collect();

        tracing::debug!(
            target: TRACING_TARGET,
            k,
            returned = results.len(),
            top_score = results.first().map(|r| r.score),
            "retrieved passages"
        );

        Ok(results)
    }

    /// Removes the persisted collection and clears the active one.
    ///
    /// Returns whether a persisted collection existed.
    pub async fn delete_collection(&mut self) -> Result<bool> {
        let index = self.index.clone();
        let name = self.collection_name.clone();

        let existed = tokio::task::spawn_blocking(move || index.delete_collection(&name))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))??;

        self.active = None;
        tracing::info!(
            target: TRACING_TARGET,
            collection = %self.collection_name,
            existed,
            "collection deleted"
        );

        Ok(existed)
    }
}

/// Checks a raw embedding and scales it to unit length.
fn normalize(mut vector: Vec<f32>, dimensions: usize) -> std::result::Result<Vec<f32>, String> {
    if vector.len() != dimensions {
        return Err(format!(
            "expected {dimensions} dimensions, got {}",
            vector.len()
        ));
    }
    if vector.iter().any(|x| !x.is_finite()) {
        return Err("embedding contains non-finite values".to_string());
    }

    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return Err("embedding is a zero vector".to_string());
    }

    vector.iter_mut().for_each(|x| *x /= norm);
    Ok(vector)
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

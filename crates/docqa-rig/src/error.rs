//! Error types for docqa-rig.

use std::fmt;
use std::path::PathBuf;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while ingesting, indexing or answering.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The documents directory holds no PDF files.
    #[error("No PDF files found in {}", .0.display())]
    NoDocumentsFound(PathBuf),

    /// A PDF could not be parsed.
    #[error("failed to read {}: {message}", path.display())]
    Pdf { path: PathBuf, message: String },

    /// The embedding backend failed or returned malformed output.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// No persisted collection with this name exists.
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    /// The collection was built with a different embedding model.
    #[error(
        "collection {collection} was built with {stored_model} ({stored_dimensions} dimensions), \
         but the configured embedder is {model} ({dimensions} dimensions)"
    )]
    EmbeddingModelMismatch {
        collection: String,
        stored_model: String,
        stored_dimensions: usize,
        model: String,
        dimensions: usize,
    },

    /// Retrieval was attempted before `build` or `load`.
    #[error("Vector store not initialized. Call build() or load() first.")]
    NotInitialized,

    /// The retrieval step of a query could not run.
    #[error("retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// The language model failed or timed out.
    #[error("generation error: {0}")]
    Generation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Index storage error.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a PDF error.
    pub fn pdf(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::Pdf {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Creates an embedding error.
    pub fn embedding(message: impl fmt::Display) -> Self {
        Self::Embedding(message.to_string())
    }

    /// Creates a retrieval unavailable error.
    pub fn retrieval_unavailable(message: impl fmt::Display) -> Self {
        Self::RetrievalUnavailable(message.to_string())
    }

    /// Creates a generation error.
    pub fn generation(message: impl fmt::Display) -> Self {
        Self::Generation(message.to_string())
    }

    /// Creates a configuration error.
    pub fn config(message: impl fmt::Display) -> Self {
        Self::Config(message.to_string())
    }

    /// Returns true for query-time backend failures that a front end should
    /// report and survive.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::RetrievalUnavailable(_) | Self::Generation(_))
    }
}

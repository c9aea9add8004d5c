//! Pipeline configuration.
//!
//! ```text
//! RagConfig
//! ├── documents: DocumentConfig  # PDF directory, chunk size and overlap
//! ├── store: StoreConfig         # Index directory, collection, batch size
//! ├── ollama: OllamaConfig       # Endpoint, model identifiers, timeout
//! └── pipeline: PipelineConfig   # Top-k, threshold, sampling, prompt
//! ```
//!
//! The configuration is built once at process start and handed by reference
//! to every component constructor.

use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::pipeline::PromptTemplate;
use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    pub const DOCUMENTS_DIR: &str = "data/documents";
    pub const CHUNK_SIZE: usize = 1000;
    pub const CHUNK_OVERLAP: usize = 200;

    pub const INDEX_DIR: &str = "data/vectorstore";
    pub const COLLECTION_NAME: &str = "document_qa_collection";
    pub const EMBEDDING_BATCH_SIZE: usize = 32;

    pub const OLLAMA_URL: &str = "http://localhost:11434";
    pub const EMBEDDING_MODEL: &str = "all-minilm";
    pub const EMBEDDING_DIMENSIONS: usize = 384;
    pub const COMPLETION_MODEL: &str = "llama3.2";
    pub const OLLAMA_TIMEOUT_SECS: u64 = 120;

    pub const TOP_K: usize = 4;
    pub const TEMPERATURE: f64 = 0.2;
    pub const MAX_TOKENS: u64 = 512;
}

/// File name of the SQLite index inside the index directory.
const INDEX_FILE_NAME: &str = "index.sqlite3";

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct RagConfig {
    /// Document discovery and splitting.
    #[cfg_attr(feature = "config", clap(flatten))]
    #[serde(default)]
    pub documents: DocumentConfig,

    /// Persistent index location.
    #[cfg_attr(feature = "config", clap(flatten))]
    #[serde(default)]
    pub store: StoreConfig,

    /// Ollama endpoint and models.
    #[cfg_attr(feature = "config", clap(flatten))]
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Retrieval and generation parameters.
    #[cfg_attr(feature = "config", clap(flatten))]
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl RagConfig {
    /// Validates all configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.documents.validate()?;
        self.store.validate()?;
        self.ollama.validate().map_err(Error::config)?;
        self.pipeline.validate()?;
        Ok(())
    }
}

/// Document discovery and splitting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(default)]
pub struct DocumentConfig {
    /// Directory searched recursively for PDF files.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "DOCUMENTS_DIR", default_value = defaults::DOCUMENTS_DIR)
    )]
    pub documents_dir: PathBuf,

    /// Maximum passage length in characters.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CHUNK_SIZE", default_value_t = defaults::CHUNK_SIZE)
    )]
    pub chunk_size: usize,

    /// Characters shared between consecutive passages.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CHUNK_OVERLAP", default_value_t = defaults::CHUNK_OVERLAP)
    )]
    pub chunk_overlap: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from(defaults::DOCUMENTS_DIR),
            chunk_size: defaults::CHUNK_SIZE,
            chunk_overlap: defaults::CHUNK_OVERLAP,
        }
    }
}

impl DocumentConfig {
    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::config("chunk size must be greater than 0"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Persistent index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the index database.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "VECTORSTORE_DIR", default_value = defaults::INDEX_DIR)
    )]
    pub index_dir: PathBuf,

    /// Name of the collection to build, load or delete.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "COLLECTION_NAME", default_value = defaults::COLLECTION_NAME)
    )]
    pub collection_name: String,

    /// Passages sent to the embedding backend per request.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "EMBEDDING_BATCH_SIZE", default_value_t = defaults::EMBEDDING_BATCH_SIZE)
    )]
    pub embedding_batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            index_dir: PathBuf::from(defaults::INDEX_DIR),
            collection_name: defaults::COLLECTION_NAME.to_string(),
            embedding_batch_size: defaults::EMBEDDING_BATCH_SIZE,
        }
    }
}

impl StoreConfig {
    /// Path of the SQLite index file.
    pub fn index_path(&self) -> PathBuf {
        self.index_dir.join(INDEX_FILE_NAME)
    }

    fn validate(&self) -> Result<()> {
        if self.collection_name.trim().is_empty() {
            return Err(Error::config("collection name must not be empty"));
        }
        if self.embedding_batch_size == 0 {
            return Err(Error::config("embedding batch size must be greater than 0"));
        }
        Ok(())
    }
}

/// Ollama endpoint and model configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[builder(
    name = "OllamaConfigBuilder",
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate_config")
)]
#[serde(default)]
pub struct OllamaConfig {
    /// Base URL of the Ollama daemon.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OLLAMA_BASE_URL", default_value = defaults::OLLAMA_URL)
    )]
    #[builder(default = "defaults::OLLAMA_URL.to_string()")]
    pub ollama_url: String,

    /// Embedding model identifier.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "EMBEDDING_MODEL", default_value = defaults::EMBEDDING_MODEL)
    )]
    #[builder(default = "defaults::EMBEDDING_MODEL.to_string()")]
    pub embedding_model: String,

    /// Dimensionality of the embedding model's vectors.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "EMBEDDING_DIMENSIONS", default_value_t = defaults::EMBEDDING_DIMENSIONS)
    )]
    #[builder(default = "defaults::EMBEDDING_DIMENSIONS")]
    pub embedding_dimensions: usize,

    /// Language model identifier.
    #[cfg_attr(
        feature = "config",
        arg(long = "ollama-model", env = "OLLAMA_MODEL", default_value = defaults::COMPLETION_MODEL)
    )]
    #[builder(default = "defaults::COMPLETION_MODEL.to_string()")]
    pub completion_model: String,

    /// Seconds to wait for a single Ollama request.
    #[cfg_attr(
        feature = "config",
        arg(long = "ollama-timeout", env = "OLLAMA_TIMEOUT", default_value_t = defaults::OLLAMA_TIMEOUT_SECS)
    )]
    #[builder(default = "defaults::OLLAMA_TIMEOUT_SECS")]
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            ollama_url: defaults::OLLAMA_URL.to_string(),
            embedding_model: defaults::EMBEDDING_MODEL.to_string(),
            embedding_dimensions: defaults::EMBEDDING_DIMENSIONS,
            completion_model: defaults::COMPLETION_MODEL.to_string(),
            timeout_secs: defaults::OLLAMA_TIMEOUT_SECS,
        }
    }
}

impl OllamaConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> OllamaConfigBuilder {
        OllamaConfigBuilder::default()
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the parsed base URL.
    ///
    /// # Errors
    ///
    /// Returns a message if the URL does not parse.
    pub fn base_url(&self) -> std::result::Result<Url, String> {
        Url::parse(&self.ollama_url)
            .map_err(|e| format!("invalid Ollama URL '{}': {e}", self.ollama_url))
    }

    fn validate(&self) -> std::result::Result<(), String> {
        self.base_url()?;
        if self.embedding_model.trim().is_empty() {
            return Err("embedding model must not be empty".to_string());
        }
        if self.completion_model.trim().is_empty() {
            return Err("language model must not be empty".to_string());
        }
        if self.embedding_dimensions == 0 {
            return Err("embedding dimensions must be greater than 0".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("Ollama timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl OllamaConfigBuilder {
    fn validate_config(&self) -> std::result::Result<(), String> {
        if let Some(url) = &self.ollama_url {
            Url::parse(url).map_err(|e| format!("invalid Ollama URL '{url}': {e}"))?;
        }
        if self.embedding_dimensions == Some(0) {
            return Err("embedding dimensions must be greater than 0".to_string());
        }
        if self.timeout_secs == Some(0) {
            return Err("Ollama timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Retrieval and generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(default)]
pub struct PipelineConfig {
    /// Passages retrieved per question.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "TOP_K_RESULTS", default_value_t = defaults::TOP_K)
    )]
    pub top_k: usize,

    /// Minimum cosine similarity a passage needs to be used. Unset keeps
    /// every top-k passage.
    #[cfg_attr(feature = "config", arg(long, env = "SIMILARITY_THRESHOLD"))]
    pub similarity_threshold: Option<f32>,

    /// Sampling temperature for the language model.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "TEMPERATURE", default_value_t = defaults::TEMPERATURE)
    )]
    pub temperature: f64,

    /// Maximum tokens the language model may generate.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "MAX_TOKENS", default_value_t = defaults::MAX_TOKENS)
    )]
    pub max_tokens: u64,

    /// File overriding the built-in prompt template.
    #[cfg_attr(feature = "config", arg(long = "prompt-template", env = "PROMPT_TEMPLATE_FILE"))]
    pub prompt_template_file: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: defaults::TOP_K,
            similarity_threshold: None,
            temperature: defaults::TEMPERATURE,
            max_tokens: defaults::MAX_TOKENS,
            prompt_template_file: None,
        }
    }
}

impl PipelineConfig {
    /// Loads the configured prompt template, or the built-in one.
    ///
    /// # Errors
    ///
    /// Returns an error if the template file cannot be read or lacks a
    /// placeholder.
    pub fn prompt_template(&self) -> Result<PromptTemplate> {
        match &self.prompt_template_file {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    Error::config(format!(
                        "failed to read prompt template {}: {e}",
                        path.display()
                    ))
                })?;
                PromptTemplate::new(text)
            }
            None => Ok(PromptTemplate::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::config("top-k must be greater than 0"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::config(format!(
                "temperature {} must be between 0.0 and 2.0",
                self.temperature
            )));
        }
        if let Some(threshold) = self.similarity_threshold
            && !(-1.0..=1.0).contains(&threshold)
        {
            return Err(Error::config(format!(
                "similarity threshold {threshold} must be between -1.0 and 1.0"
            )));
        }
        self.prompt_template()?;
        Ok(())
    }
}

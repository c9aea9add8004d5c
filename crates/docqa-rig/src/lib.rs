#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod config;
pub mod document;
mod error;
pub mod pipeline;
#[cfg(feature = "ollama")]
#[cfg_attr(docsrs, doc(cfg(feature = "ollama")))]
pub mod provider;
pub mod store;

pub use config::{DocumentConfig, OllamaConfig, PipelineConfig, RagConfig, StoreConfig};
pub use document::DocumentProcessor;
pub use error::{Error, Result};
pub use pipeline::{AnswerPipeline, AnswerRecord, PromptTemplate, format_sources};
pub use store::VectorStore;

/// Tracing target for the main library.
pub const TRACING_TARGET: &str = "docqa_rig";

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod health;

pub mod emb;
pub mod llm;
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;
pub mod types;

pub use emb::{EmbeddingProvider, EmbeddingService};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use health::{ServiceHealth, ServiceStatus};
pub use llm::{CompletionProvider, CompletionRequest, CompletionService};
pub use types::{Passage, PassageMetadata, ScoredPassage};

/// Tracing target for the core crate.
pub const TRACING_TARGET: &str = "docqa_core";

//! Shared data model.

mod passage;

pub use passage::{Passage, PassageMetadata, ScoredPassage};

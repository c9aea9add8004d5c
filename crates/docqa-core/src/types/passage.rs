//! Passages and retrieval results.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Where a passage came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageMetadata {
    /// Path of the source document.
    pub source_path: String,
    /// 1-based page number the passage starts on.
    pub page_number: u32,
    /// Position of the passage within the ingestion run.
    pub chunk_sequence_id: u64,
}

/// A bounded span of document text, the unit of indexing and retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// The passage text.
    pub content: String,
    /// Source metadata.
    pub metadata: PassageMetadata,
}

impl Passage {
    /// Creates a new passage.
    pub fn new(content: impl Into<String>, metadata: PassageMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Returns the file name of the source document, or the full path if it
    /// has none.
    pub fn source_file(&self) -> &str {
        Path::new(&self.metadata.source_path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.metadata.source_path)
    }

    /// Returns the first `max_chars` characters of the content.
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.content.char_indices().nth(max_chars) {
            Some((end, _)) => &self.content[..end],
            None => &self.content,
        }
    }

    /// Returns the SHA-256 digest of the content.
    pub fn content_sha256(&self) -> [u8; 32] {
        Sha256::digest(self.content.as_bytes()).into()
    }
}

/// A passage paired with its similarity to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    /// The retrieved passage.
    pub passage: Passage,
    /// Cosine similarity between the passage and the query.
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(content: &str, source_path: &str) -> Passage {
        Passage::new(
            content,
            PassageMetadata {
                source_path: source_path.to_string(),
                page_number: 1,
                chunk_sequence_id: 0,
            },
        )
    }

    #[test]
    fn source_file_strips_directories() {
        let p = passage("text", "data/documents/reports/q1.pdf");
        assert_eq!(p.source_file(), "q1.pdf");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let p = passage("héllo wörld", "a.pdf");
        assert_eq!(p.preview(4), "héll");
        assert_eq!(p.preview(100), "héllo wörld");
    }

    #[test]
    fn digest_depends_on_content_only() {
        let a = passage("same", "a.pdf");
        let b = passage("same", "b.pdf");
        assert_eq!(a.content_sha256(), b.content_sha256());
        assert_ne!(a.content_sha256(), passage("other", "a.pdf").content_sha256());
    }
}

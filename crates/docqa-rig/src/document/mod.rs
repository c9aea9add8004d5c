//! PDF discovery, text extraction and passage splitting.
//!
//! The [`DocumentProcessor`] walks a directory for PDF files, extracts the
//! text of every page, joins the pages of each document and splits the
//! result into overlapping passages tagged with source path, starting page
//! and a run-wide sequence number.

mod pdf;
mod splitter;

use std::path::{Path, PathBuf};

use docqa_core::{Passage, PassageMetadata};
use walkdir::WalkDir;

#[cfg(test)]
pub(crate) use self::pdf::write_test_pdf;
pub use self::pdf::extract_pages;
pub use self::splitter::{PageChunk, Splitter};
use crate::config::DocumentConfig;
use crate::{Error, Result};

/// Tracing target for document processing.
pub const TRACING_TARGET: &str = "docqa_rig::document";

/// Turns a directory of PDF files into passages.
pub struct DocumentProcessor {
    splitter: Splitter,
}

impl DocumentProcessor {
    /// Creates a processor with the configured chunk size and overlap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the overlap is not smaller than the
    /// chunk size.
    pub fn new(config: &DocumentConfig) -> Result<Self> {
        Ok(Self {
            splitter: Splitter::new(config.chunk_size, config.chunk_overlap)?,
        })
    }

    /// Lists every PDF file below `directory`, sorted by path.
    ///
    /// The extension check is case-insensitive. A missing directory yields
    /// an empty list.
    pub fn discover(directory: &Path) -> Vec<PathBuf> {
        if !directory.is_dir() {
            return Vec::new();
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(directory)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        error = %error,
                        "skipping unreadable directory entry"
                    );
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
            })
            .collect();

        paths.sort();
        paths
    }

    /// Extracts and splits every PDF below `directory`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoDocumentsFound`] if the directory holds no PDF
    /// files, or [`Error::Pdf`] if a file cannot be parsed.
    pub async fn process(&self, directory: &Path) -> Result<Vec<Passage>> {
        let files = Self::discover(directory);
        if files.is_empty() {
            return Err(Error::NoDocumentsFound(directory.to_path_buf()));
        }

        tracing::info!(
            target: TRACING_TARGET,
            directory = %directory.display(),
            files = files.len(),
            "processing documents"
        );

        let mut passages = Vec::new();
        let mut chunk_sequence_id = 0_u64;

        for path in &files {
            let pages = extract_pages(path).await?;
            let chunks = self.splitter.split_pages(&pages);

            tracing::debug!(
                target: TRACING_TARGET,
                path = %path.display(),
                pages = pages.len(),
                passages = chunks.len(),
                "split document"
            );

            let source_path = path.to_string_lossy().into_owned();
            for chunk in chunks {
                passages.push(Passage::new(
                    chunk.text,
                    PassageMetadata {
                        source_path: source_path.clone(),
                        page_number: chunk.page_number,
                        chunk_sequence_id,
                    },
                ));
                chunk_sequence_id += 1;
            }
        }

        tracing::info!(
            target: TRACING_TARGET,
            files = files.len(),
            passages = passages.len(),
            "documents processed"
        );

        if let Some(sample) = passages.first() {
            tracing::debug!(
                target: TRACING_TARGET,
                source = %sample.metadata.source_path,
                page = sample.metadata.page_number,
                chunk = sample.metadata.chunk_sequence_id,
                content = sample.preview(200),
                "sample passage"
            );
        }

        Ok(passages)
    }
}

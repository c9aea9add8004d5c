//! Human-readable rendering of the passages behind an answer.

use docqa_core::Passage;

/// Characters of passage content shown per source.
const PREVIEW_CHARS: usize = 150;

/// Text shown when an answer has no supporting passages.
pub const NO_SOURCES: &str = "No sources found.";

/// Renders a numbered list of sources with file name, page and a content
/// preview, or [`NO_SOURCES`] when the list is empty.
pub fn format_sources(passages: &[Passage]) -> String {
    if passages.is_empty() {
        return NO_SOURCES.to_string();
    }

    passages
        .iter()
        .enumerate()
        .map(|(i, passage)| {
            format!(
                "[{}] File: {} | Page: {}\n    Content: {}...\n",
                i + 1,
                passage.source_file(),
                passage.metadata.page_number,
                passage.preview(PREVIEW_CHARS),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

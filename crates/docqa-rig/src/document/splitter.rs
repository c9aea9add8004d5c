//! Page-aware text splitting.

use text_splitter::{ChunkConfig, TextSplitter};

use crate::{Error, Result};

/// Separator inserted between consecutive pages of one document.
const PAGE_SEPARATOR: &str = "\n\n";

/// A piece of split text and the page it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageChunk {
    /// The chunk text.
    pub text: String,
    /// 1-based page number of the chunk's first character.
    pub page_number: u32,
}

/// Splits document text into overlapping chunks no longer than the
/// configured number of characters.
///
/// Splitting prefers paragraph breaks, then line breaks, then spaces, and
/// falls back to character boundaries, so no chunk exceeds the maximum.
pub struct Splitter {
    inner: TextSplitter<text_splitter::Characters>,
}

impl Splitter {
    /// Creates a new splitter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the overlap is not smaller than the
    /// chunk size.
    pub fn new(max_characters: usize, overlap: usize) -> Result<Self> {
        let config = ChunkConfig::new(max_characters)
            .with_overlap(overlap)
            .map_err(|e| Error::config(format!("invalid chunk configuration: {e}")))?
            .with_trim(true);

        Ok(Self {
            inner: TextSplitter::new(config),
        })
    }

    /// Splits a single text.
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.inner.chunks(text).collect()
    }

    /// Joins the pages of one document and splits the result, tagging every
    /// chunk with the page its first character came from.
    ///
    /// `pages` holds `(page_number, text)` pairs in reading order. Pages
    /// without text are skipped.
    pub fn split_pages(&self, pages: &[(u32, String)]) -> Vec<PageChunk> {
        let mut text = String::new();
        let mut page_starts: Vec<(usize, u32)> = Vec::with_capacity(pages.len());

        for (page_number, page_text) in pages {
            if page_text.trim().is_empty() {
                continue;
            }
            if !text.is_empty() {
                text.push_str(PAGE_SEPARATOR);
            }
            page_starts.push((text.len(), *page_number));
            text.push_str(page_text);
        }

        self.inner
            .chunk_indices(&text)
            .map(|(offset, chunk)| {
                let index = page_starts
                    .partition_point(|(start, _)| *start <= offset)
                    .saturating_sub(1);
                let page_number = page_starts.get(index).map_or(1, |(_, page)| *page);

                PageChunk {
                    text: chunk.to_string(),
                    page_number,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(texts: &[&str]) -> Vec<(u32, String)> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| (i as u32 + 1, text.to_string()))
            .collect()
    }

    #[test]
    fn short_text_is_one_chunk() {
        let splitter = Splitter::new(1000, 200).expect("valid config");
        let chunks = splitter.split_pages(&pages(&["The sky is blue."]));
        assert_eq!(
            chunks,
            vec![PageChunk {
                text: "The sky is blue.".to_string(),
                page_number: 1,
            }]
        );
    }

    #[test]
    fn chunks_never_exceed_the_maximum() {
        let splitter = Splitter::new(50, 10).expect("valid config");
        let word_salad = "lorem ipsum dolor sit amet ".repeat(40);
        let unbroken = "x".repeat(180);

        for chunk in splitter.split(&word_salad).into_iter().chain(splitter.split(&unbroken)) {
            assert!(chunk.chars().count() <= 50, "chunk too long: {chunk:?}");
        }
        assert!(splitter.split(&unbroken).len() >= 4);
    }

    /// Unpunctuated prose, so word boundaries are the finest split level.
    fn prose(words: usize) -> String {
        const VOCABULARY: [&str; 12] = [
            "river", "stone", "quiet", "market", "lantern", "harbor", "window", "meadow",
            "copper", "signal", "orchard", "valley",
        ];
        (0..words)
            .map(|i| VOCABULARY[(i * 7 + i / 3) % VOCABULARY.len()])
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn consecutive_chunks_overlap_by_about_the_configured_width() {
        let splitter = Splitter::new(1000, 200).expect("valid config");
        let text = prose(1200);
        let chunks: Vec<(usize, &str)> = splitter.inner.chunk_indices(&text).collect();
        assert!(chunks.len() > 3);

        for pair in chunks.windows(2) {
            let (prev_offset, prev) = pair[0];
            let (next_offset, _) = pair[1];
            let overlap = (prev_offset + prev.len()).saturating_sub(next_offset);
            assert!(
                (160..=200).contains(&overlap),
                "overlap of {overlap} characters at offset {next_offset}"
            );
        }
    }

    #[test]
    fn chunks_cover_every_page_character() {
        let splitter = Splitter::new(120, 30).expect("valid config");
        let last_page = format!("{}\n\n{}", prose(40), prose(55));
        let document = pages(&[prose(90).as_str(), "Short second page.", last_page.as_str()]);
        let text = document
            .iter()
            .map(|(_, page)| page.as_str())
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR);

        let mut covered = vec![false; text.len()];
        for (offset, chunk) in splitter.inner.chunk_indices(&text) {
            assert_eq!(&text[offset..offset + chunk.len()], chunk);
            covered[offset..offset + chunk.len()].fill(true);
        }

        for (index, ch) in text.char_indices() {
            assert!(
                ch.is_whitespace() || covered[index],
                "character {ch:?} at {index} is in no chunk"
            );
        }
        assert_eq!(
            splitter.split_pages(&document).len(),
            splitter.inner.chunk_indices(&text).count()
        );
    }

    #[test]
    fn chunks_keep_their_starting_page() {
        let splitter = Splitter::new(30, 0).expect("valid config");
        let chunks = splitter.split_pages(&pages(&[
            "First page paragraph.",
            "",
            "Third page paragraph.",
        ]));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page_number, 1);
        assert_eq!(chunks[0].text, "First page paragraph.");
        assert_eq!(chunks[1].page_number, 3);
        assert_eq!(chunks[1].text, "Third page paragraph.");
    }

    #[test]
    fn reject_overlap_larger_than_chunk() {
        assert!(matches!(Splitter::new(10, 20), Err(Error::Config(_))));
    }
}

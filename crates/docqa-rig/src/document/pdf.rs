//! Per-page PDF text extraction.

use std::path::Path;

use lopdf::Document;

use super::TRACING_TARGET;
use crate::{Error, Result};

/// Extracts the text of every page of a PDF, in page order.
///
/// Returns `(page_number, text)` pairs with 1-based page numbers. Pages
/// whose text cannot be decoded yield an empty string and a warning.
pub async fn extract_pages(path: &Path) -> Result<Vec<(u32, String)>> {
    let path = path.to_path_buf();
    let display_path = path.clone();

    tokio::task::spawn_blocking(move || extract_pages_blocking(&path))
        .await
        .map_err(|e| Error::pdf(display_path, format!("extraction task failed: {e}")))?
}

fn extract_pages_blocking(path: &Path) -> Result<Vec<(u32, String)>> {
    let document = Document::load(path).map_err(|e| Error::pdf(path, e))?;
    let pages = document.get_pages();

    let mut extracted = Vec::with_capacity(pages.len());
    for page_number in pages.keys().copied() {
        let text = match document.extract_text(&[page_number]) {
            Ok(text) => text.trim().to_string(),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    path = %path.display(),
                    page = page_number,
                    error = %error,
                    "skipping page without extractable text"
                );
                String::new()
            }
        };
        extracted.push((page_number, text));
    }

    Ok(extracted)
}

/// Writes a minimal PDF with one page of Courier text per entry.
#[cfg(test)]
pub(crate) fn write_test_pdf(path: &Path, pages: &[&str]) {
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let encoded = content.encode().expect("encode page content");
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("save test pdf");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn extracts_text_per_page() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("two-pages.pdf");
        write_test_pdf(&path, &["The sky is blue.", "Grass is green."]);

        let pages = extract_pages(&path).await?;
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].0, 1);
        assert!(pages[0].1.contains("The sky is blue."));
        assert_eq!(pages[1].0, 2);
        assert!(pages[1].1.contains("Grass is green."));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_file_is_a_pdf_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf")?;

        assert!(matches!(extract_pages(&path).await, Err(Error::Pdf { .. })));
        Ok(())
    }
}

//! PDF text extraction

use lopdf::Document;

use crate::error::{Error, Result};

/// Page-by-page PDF text extractor
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Extract the text of every page, in page order, each page followed by a newline.
    ///
    /// Fails as a whole if the document cannot be loaded or any single page cannot be
    /// decoded; partial text would shift unit boundaries downstream.
    pub fn extract(filename: &str, data: &[u8]) -> Result<String> {
        let doc = Document::load_mem(data)
            .map_err(|e| Error::extraction(filename, format!("Failed to load PDF: {}", e)))?;

        if doc.is_encrypted() {
            return Err(Error::extraction(filename, "PDF is encrypted"));
        }

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(Error::extraction(filename, "PDF has no pages"));
        }

        let mut text = String::new();
        for page_number in pages.keys() {
            let page_text = doc.extract_text(&[*page_number]).map_err(|e| {
                Error::extraction(
                    filename,
                    format!("Failed to decode page {}: {}", page_number, e),
                )
            })?;
            text.push_str(&page_text);
            text.push('\n');
        }

        tracing::debug!(
            "Extracted {} chars from {} pages of '{}'",
            text.len(),
            pages.len(),
            filename
        );

        Ok(text)
    }
}

//! # FinDoc Ext PDF
//!
//! [`TextExtractor`] implementation for PDF statements, backed by
//! `pdf-extract`.
//!
//! Parsing is synchronous and CPU-bound, so it runs on the blocking pool.
//! The parser can panic on malformed input; a panic is reported as an
//! extraction failure instead of taking the request down.
//!
//! Text is extracted page by page and each page is headed by a
//! `--- Page N ---` marker, so the analyzer sees where tables break.

#![warn(missing_docs)]
#![warn(clippy::all)]

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use findoc_traits::extraction::TextExtractor;
use findoc_traits::TraitError;

/// Every PDF starts with `%PDF-`.
const PDF_SIGNATURE: &[u8] = b"%PDF";

/// Shortest payload that can carry the full `%PDF-` header.
const MIN_PDF_LEN: usize = 5;

/// Join per-page text, each page headed by a `--- Page N ---` marker.
///
/// Returns an empty string when no page carries any text, so image-only
/// documents still read as blank.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    if pages.iter().all(|p| p.as_ref().trim().is_empty()) {
        return String::new();
    }

    let mut text = String::new();
    for (idx, page) in pages.iter().enumerate() {
        text.push_str(&format!("--- Page {} ---\n", idx + 1));
        text.push_str(page.as_ref().trim_end());
        text.push_str("\n\n");
    }
    text
}

/// PDF text extractor.
#[derive(Debug, Clone, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self
    }
}

/// Check the PDF magic bytes.
pub fn has_pdf_signature(content: &[u8]) -> bool {
    content.len() >= MIN_PDF_LEN && content.starts_with(PDF_SIGNATURE)
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    fn is_valid_document(&self, content: &[u8]) -> bool {
        has_pdf_signature(content)
    }

    async fn extract_text(&self, content: Bytes) -> Result<String, TraitError> {
        let size = content.len();
        let pages =
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&content))
                .await
                .map_err(|e| {
                    if e.is_panic() {
                        TraitError::ExtractionFailed("PDF parser panicked on malformed input".into())
                    } else {
                        TraitError::ExtractionFailed(format!("extraction task failed: {}", e))
                    }
                })?
                .map_err(|e| TraitError::ExtractionFailed(e.to_string()))?;

        let text = join_pages(&pages);
        debug!(bytes = size, pages = pages.len(), chars = text.len(), "Extracted PDF text");
        Ok(text)
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}

//! Document text extraction traits.
//!
//! A [`TextExtractor`] turns raw document bytes into plain text. It also
//! owns the format signature check, so the pipeline can reject a payload
//! before paying for extraction.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::TraitError;

/// Converts raw document bytes to plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Check the document-format signature (magic bytes).
    fn is_valid_document(&self, content: &[u8]) -> bool;

    /// Extract all text from the document.
    ///
    /// May return empty or whitespace-only text for image-only documents;
    /// deciding whether that is acceptable belongs to the caller.
    async fn extract_text(&self, content: Bytes) -> Result<String, TraitError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

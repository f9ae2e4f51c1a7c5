//! # Text Extractor
//!
//! Turns an uploaded document into plain text: embedded text extraction for
//! PDFs (`lopdf`), Tesseract OCR for photos.

use std::sync::Arc;

use lopdf::Document;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::errors::PipelineError;
use crate::instance_manager::OcrInstanceManager;
use crate::ocr;
use crate::ocr_config::OcrConfig;

/// Declared kind of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Pdf,
    Image,
}

impl DocumentKind {
    /// Map a Telegram document MIME type to a kind the extractor handles
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.to_ascii_lowercase();
        if mime == "application/pdf" {
            Some(DocumentKind::Pdf)
        } else if mime.starts_with("image/") {
            Some(DocumentKind::Image)
        } else {
            None
        }
    }
}

/// Raw bytes of an uploaded document plus what the sender says it is
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub bytes: Vec<u8>,
    pub kind: DocumentKind,
    pub file_name: String,
}

impl SourceDocument {
    pub fn new(bytes: Vec<u8>, kind: DocumentKind, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            kind,
            file_name: file_name.into(),
        }
    }
}

/// Extracts text from PDFs and photos
///
/// The OCR engine pool and circuit breaker are shared between all extractor
/// clones, so one extractor can serve every chat.
#[derive(Clone)]
pub struct TextExtractor {
    ocr_config: OcrConfig,
    ocr_instances: Arc<OcrInstanceManager>,
    ocr_breaker: Arc<CircuitBreaker>,
}

impl TextExtractor {
    pub fn new(ocr_config: OcrConfig) -> Self {
        let ocr_breaker = Arc::new(CircuitBreaker::new(ocr_config.recovery.clone()));
        Self {
            ocr_config,
            ocr_instances: Arc::new(OcrInstanceManager::new()),
            ocr_breaker,
        }
    }

    pub fn ocr_config(&self) -> &OcrConfig {
        &self.ocr_config
    }

    /// Best-effort text of the whole document, in page order
    ///
    /// # Errors
    ///
    /// [`PipelineError::Decode`] when the bytes are not a readable document of
    /// the declared kind. No partial text is returned on failure.
    pub async fn extract(&self, document: &SourceDocument) -> Result<String, PipelineError> {
        debug!(
            file_name = %document.file_name,
            kind = ?document.kind,
            size_bytes = document.bytes.len(),
            "Extracting text from document"
        );

        let text = match document.kind {
            DocumentKind::Pdf => extract_pdf_text(&document.bytes)?,
            DocumentKind::Image => {
                ocr::extract_text_from_image(
                    &document.bytes,
                    &self.ocr_config,
                    &self.ocr_instances,
                    &self.ocr_breaker,
                )
                .await?
            }
        };

        info!(
            file_name = %document.file_name,
            chars_extracted = text.len(),
            "Text extraction completed"
        );
        Ok(text)
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(OcrConfig::default())
    }
}

/// Concatenate the embedded text of every page, in page order
///
/// A newline follows each page's text.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, PipelineError> {
    let document = Document::load_mem(bytes)?;

    // get_pages is keyed by 1-based page number, so iteration is in page order
    let pages = document.get_pages();
    let mut text = String::new();
    for page_number in pages.keys() {
        let page_text = document.extract_text(&[*page_number]).map_err(|e| {
            warn!(page = page_number, error = %e, "Failed to extract text from PDF page");
            PipelineError::Decode(format!("page {page_number}: {e}"))
        })?;
        text.push_str(&page_text);
        text.push('\n');
    }

    debug!(pages = pages.len(), chars_extracted = text.len(), "PDF text extracted");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(DocumentKind::from_mime("application/pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_mime("image/jpeg"), Some(DocumentKind::Image));
        assert_eq!(DocumentKind::from_mime("IMAGE/PNG"), Some(DocumentKind::Image));
        assert_eq!(DocumentKind::from_mime("application/msword"), None);
    }

    #[test]
    fn test_malformed_pdf_is_decode_error() {
        let result = extract_pdf_text(b"this is definitely not a pdf");
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }

    #[tokio::test]
    async fn test_image_declared_but_pdf_bytes_is_decode_error() {
        let extractor = TextExtractor::default();
        let document = SourceDocument::new(
            b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n".to_vec(),
            DocumentKind::Image,
            "scan.jpg",
        );
        let result = extractor.extract(&document).await;
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }
}

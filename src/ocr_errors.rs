//! # OCR Error Types Module
//!
//! Structured errors for photo OCR. They are folded into
//! [`PipelineError::Decode`](crate::errors::PipelineError) at the extractor
//! boundary.

/// Custom error types for OCR operations
#[derive(Debug, Clone, PartialEq)]
pub enum OcrError {
    /// The bytes are not an image Tesseract accepts, or exceed a size limit
    Validation(String),
    /// Tesseract could not be initialized for the configured languages
    Initialization(String),
    /// Leptonica could not decode the image
    ImageLoad(String),
    /// Tesseract failed while recognizing text
    Extraction(String),
    /// The OCR call exceeded the configured timeout
    Timeout(String),
    /// The circuit breaker is open after repeated failures
    CircuitOpen,
}

impl std::fmt::Display for OcrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrError::Validation(msg) => write!(f, "Validation error: {msg}"),
            OcrError::Initialization(msg) => write!(f, "Initialization error: {msg}"),
            OcrError::ImageLoad(msg) => write!(f, "Image load error: {msg}"),
            OcrError::Extraction(msg) => write!(f, "Extraction error: {msg}"),
            OcrError::Timeout(msg) => write!(f, "Timeout error: {msg}"),
            OcrError::CircuitOpen => {
                write!(f, "OCR temporarily unavailable after repeated failures")
            }
        }
    }
}

impl std::error::Error for OcrError {}

impl From<anyhow::Error> for OcrError {
    fn from(err: anyhow::Error) -> Self {
        OcrError::Extraction(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_formatting() {
        let err = OcrError::Validation("Test validation error".to_string());
        assert_eq!(err.to_string(), "Validation error: Test validation error");

        let err = OcrError::Timeout("after 30s".to_string());
        assert_eq!(err.to_string(), "Timeout error: after 30s");
    }

    #[test]
    fn test_anyhow_conversion_maps_to_extraction() {
        let err: OcrError = anyhow::anyhow!("boom").into();
        assert_eq!(err, OcrError::Extraction("boom".to_string()));
    }
}

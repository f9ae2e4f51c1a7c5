//! # Pipeline Error Types
//!
//! Error taxonomy of the assignment pipeline. Decode, render and storage
//! failures are fatal for a run; generation failures are recovered per
//! question by the answer generator and never abort a batch.

use crate::ocr_errors::OcrError;

/// Fatal errors of the assignment pipeline
#[derive(Debug)]
pub enum PipelineError {
    /// The source bytes are not a readable document of the declared kind
    Decode(String),
    /// The document body could not be laid out (e.g. it was empty)
    Render(String),
    /// Writing the artifact failed or produced an empty file
    Storage(String),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Decode(msg) => write!(f, "Could not read document: {msg}"),
            PipelineError::Render(msg) => write!(f, "Could not render document: {msg}"),
            PipelineError::Storage(msg) => write!(f, "Could not store document: {msg}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<OcrError> for PipelineError {
    fn from(err: OcrError) -> Self {
        PipelineError::Decode(err.to_string())
    }
}

impl From<lopdf::Error> for PipelineError {
    fn from(err: lopdf::Error) -> Self {
        PipelineError::Decode(err.to_string())
    }
}

/// Failure of a single call to the generation service
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// Transport-level failure (connection, timeout, body decoding)
    Http(String),
    /// The service answered with a non-success status
    Api { status: u16, message: String },
    /// The service answered successfully but without any choice
    EmptyResponse,
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationError::Http(msg) => write!(f, "HTTP error: {msg}"),
            GenerationError::Api { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            GenerationError::EmptyResponse => write!(f, "the service returned no choices"),
        }
    }
}

impl std::error::Error for GenerationError {}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Http(err.to_string())
    }
}

//! # Photo OCR
//!
//! Optical character recognition of uploaded photos with Tesseract
//! (`leptess`). Images are recognized straight from memory; format and size
//! are checked from the byte signature before the engine is touched.

use std::sync::Arc;
use std::time::Duration;

use image::ImageFormat;
use tracing::{debug, info, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::instance_manager::OcrInstanceManager;
use crate::ocr_config::OcrConfig;
use crate::ocr_errors::OcrError;

/// Detect the image format from the leading bytes and check it against the limits
///
/// Tesseract accepts PNG, JPEG, BMP and TIFF.
pub fn validate_image_bytes(bytes: &[u8], config: &OcrConfig) -> Result<ImageFormat, OcrError> {
    if bytes.len() < config.min_format_bytes {
        return Err(OcrError::Validation(format!(
            "need at least {} bytes to detect the image format, got {}",
            config.min_format_bytes,
            bytes.len()
        )));
    }

    let head = &bytes[..bytes.len().min(config.buffer_size)];
    let format = image::guess_format(head)
        .map_err(|e| OcrError::Validation(format!("unrecognized image format: {e}")))?;

    let limit = config
        .effective_limit(format)
        .ok_or_else(|| OcrError::Validation(format!("unsupported image format: {format:?}")))?;

    let size = bytes.len() as u64;
    if size > limit {
        return Err(OcrError::Validation(format!(
            "{format:?} image is {size} bytes, limit is {limit} bytes"
        )));
    }

    debug!(format = ?format, size_bytes = size, "Image passed format validation");
    Ok(format)
}

/// `true` when the bytes look like an image OCR can process
pub fn is_supported_image_format(bytes: &[u8], config: &OcrConfig) -> bool {
    validate_image_bytes(bytes, config).is_ok()
}

/// Trim every line and drop the empty ones
pub fn clean_ocr_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Recognize the text of an in-memory image
///
/// Fails fast with [`OcrError::CircuitOpen`] while the breaker is open.
/// Engine and decoding failures count towards the breaker; validation
/// failures (the user's upload) do not.
pub async fn extract_text_from_image(
    bytes: &[u8],
    config: &OcrConfig,
    manager: &Arc<OcrInstanceManager>,
    breaker: &CircuitBreaker,
) -> Result<String, OcrError> {
    if breaker.is_open() {
        warn!("OCR circuit breaker is open, rejecting request");
        return Err(OcrError::CircuitOpen);
    }

    let format = validate_image_bytes(bytes, config)?;
    info!(format = ?format, size_bytes = bytes.len(), "Starting OCR text extraction");

    let result = run_engine(bytes, config, manager).await;
    match &result {
        Ok(text) => {
            breaker.record_success();
            info!(chars_extracted = text.len(), "OCR extraction completed");
        }
        Err(e) => {
            breaker.record_failure();
            if matches!(e, OcrError::Extraction(_) | OcrError::Timeout(_)) {
                manager.evict(&config.languages);
            }
            warn!(error = %e, failures = breaker.consecutive_failures(), "OCR extraction failed");
        }
    }
    result
}

/// Engine creation and recognition both block, so both run off the async workers
async fn run_engine(
    bytes: &[u8],
    config: &OcrConfig,
    manager: &Arc<OcrInstanceManager>,
) -> Result<String, OcrError> {
    let manager = Arc::clone(manager);
    let engine_config = config.clone();
    let image = bytes.to_vec();

    let task = tokio::task::spawn_blocking(move || {
        let engine = manager.get_instance(&engine_config)?;
        let mut tess = engine.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        tess.set_image_from_mem(&image)
            .map_err(|e| OcrError::ImageLoad(e.to_string()))?;
        tess.get_utf8_text()
            .map_err(|e| OcrError::Extraction(e.to_string()))
    });

    let timeout = Duration::from_secs(config.recovery.operation_timeout_secs);
    let raw = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(join_err)) => return Err(OcrError::Extraction(join_err.to_string())),
        Err(_) => {
            return Err(OcrError::Timeout(format!(
                "OCR did not finish within {}s",
                config.recovery.operation_timeout_secs
            )))
        }
    };

    Ok(clean_ocr_text(&raw))
}

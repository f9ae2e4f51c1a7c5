//! # OCR Configuration Module
//!
//! Configuration structures for photo OCR: language selection, format
//! detection, per-format size limits and the failure-handling knobs used by
//! the circuit breaker.

// Constants for OCR configuration
pub const DEFAULT_LANGUAGES: &str = "eng";
pub const FORMAT_DETECTION_BUFFER_SIZE: usize = 32;
pub const MIN_FORMAT_BYTES: usize = 8;
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB limit for image files

/// Failure handling configuration for OCR calls
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Timeout for a single OCR operation in seconds
    pub operation_timeout_secs: u64,
    /// Consecutive failures before the circuit opens
    pub circuit_breaker_threshold: u32,
    /// Seconds the circuit stays open before a trial call is let through
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            operation_timeout_secs: 30,
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60,
        }
    }
}

/// Format-specific file size limits for uploaded photos
#[derive(Debug, Clone)]
pub struct FormatSizeLimits {
    pub png_max: u64,
    pub jpeg_max: u64,
    pub bmp_max: u64,
    pub tiff_max: u64,
}

impl Default for FormatSizeLimits {
    fn default() -> Self {
        Self {
            png_max: 15 * 1024 * 1024,
            jpeg_max: 10 * 1024 * 1024,
            bmp_max: 5 * 1024 * 1024,
            tiff_max: 20 * 1024 * 1024,
        }
    }
}

impl FormatSizeLimits {
    /// Size limit for a detected image format, `None` when OCR does not accept it
    pub fn limit_for(&self, format: image::ImageFormat) -> Option<u64> {
        match format {
            image::ImageFormat::Png => Some(self.png_max),
            image::ImageFormat::Jpeg => Some(self.jpeg_max),
            image::ImageFormat::Bmp => Some(self.bmp_max),
            image::ImageFormat::Tiff => Some(self.tiff_max),
            _ => None,
        }
    }
}

/// Configuration structure for OCR processing
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Tesseract language codes (e.g., "eng", "eng+fra")
    pub languages: String,
    /// Number of leading bytes inspected for format detection
    pub buffer_size: usize,
    /// Minimum bytes required for format detection
    pub min_format_bytes: usize,
    /// Maximum allowed size in bytes regardless of format
    pub max_file_size: u64,
    pub format_limits: FormatSizeLimits,
    pub recovery: RecoveryConfig,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.to_string(),
            buffer_size: FORMAT_DETECTION_BUFFER_SIZE,
            min_format_bytes: MIN_FORMAT_BYTES,
            max_file_size: MAX_FILE_SIZE,
            format_limits: FormatSizeLimits::default(),
            recovery: RecoveryConfig::default(),
        }
    }
}

impl OcrConfig {
    /// Default configuration with a different Tesseract language set
    pub fn with_languages(languages: impl Into<String>) -> Self {
        Self {
            languages: languages.into(),
            ..Self::default()
        }
    }

    /// Effective size limit for a format: the tighter of the global and format limits
    pub fn effective_limit(&self, format: image::ImageFormat) -> Option<u64> {
        self.format_limits
            .limit_for(format)
            .map(|limit| limit.min(self.max_file_size))
    }
}

//! # OCR Instance Manager Module
//!
//! Keeps one Tesseract engine per language set so that photo uploads do not
//! pay the engine initialization cost (hundreds of milliseconds) on every
//! request.

use leptess::LepTess;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::ocr_config::OcrConfig;
use crate::ocr_errors::OcrError;

/// Shared handle to a Tesseract engine
pub type SharedEngine = Arc<Mutex<LepTess>>;

/// Thread-safe pool of Tesseract engines keyed by language configuration
///
/// Engines are created on first request for a language set and reused
/// afterwards. An engine that failed mid-recognition is evicted with
/// [`OcrInstanceManager::evict`] so the next request starts from a fresh one.
#[derive(Default)]
pub struct OcrInstanceManager {
    instances: Mutex<HashMap<String, SharedEngine>>,
}

impl OcrInstanceManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SharedEngine>> {
        self.instances
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get or create the engine for `config.languages`
    ///
    /// # Errors
    ///
    /// [`OcrError::Initialization`] when Tesseract rejects the language set
    /// (e.g. missing traineddata files).
    pub fn get_instance(&self, config: &OcrConfig) -> Result<SharedEngine, OcrError> {
        let key = config.languages.clone();

        if let Some(instance) = self.lock().get(&key) {
            return Ok(Arc::clone(instance));
        }

        info!(languages = %key, "Creating new OCR instance");
        let tess = LepTess::new(None, &key)
            .map_err(|e| OcrError::Initialization(format!("languages {key}: {e}")))?;
        let instance = Arc::new(Mutex::new(tess));

        // Another request may have raced us; keep whichever landed first
        let mut instances = self.lock();
        let stored = instances.entry(key).or_insert_with(|| Arc::clone(&instance));
        Ok(Arc::clone(stored))
    }

    /// Drop the engine for a language set so it is rebuilt on next use
    pub fn evict(&self, languages: &str) {
        if self.lock().remove(languages).is_some() {
            warn!(languages = %languages, "Evicted OCR instance");
        }
    }

    /// Number of cached engines
    pub fn instance_count(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_manager_is_empty() {
        let manager = OcrInstanceManager::new();
        assert_eq!(manager.instance_count(), 0);
    }

    #[test]
    fn test_evicting_unknown_language_is_noop() {
        let manager = OcrInstanceManager::new();
        manager.evict("eng");
        assert_eq!(manager.instance_count(), 0);
    }
}

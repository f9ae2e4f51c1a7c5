//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: Handles incoming text, photo, and document messages
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `dialogue_manager`: Handles input that belongs to an open session
//! - `ui_builder`: Creates keyboards and formats messages
//! - `helpers`: Text sanitizing, truncation and splitting

use std::sync::Arc;

use crate::config::BotConfig;
use crate::extractor::TextExtractor;
use crate::generator::TextGenerator;
use crate::pipeline::AssignmentPipeline;

pub mod callback_handler;
pub mod dialogue_manager;
pub mod helpers;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

/// Services shared by every handler invocation
pub struct AppState {
    pub pipeline: AssignmentPipeline,
    pub extractor: TextExtractor,
    pub generator: Arc<dyn TextGenerator>,
    pub session_ttl: chrono::Duration,
}

impl AppState {
    /// The pipeline and the study handlers share one OCR engine pool
    pub fn new(config: &BotConfig, generator: Arc<dyn TextGenerator>) -> Self {
        let extractor = TextExtractor::new(config.ocr.clone());
        let pipeline = AssignmentPipeline::new(
            extractor.clone(),
            Arc::clone(&generator),
            config.generation_concurrency,
            config.upload_folder.clone(),
        );
        Self {
            pipeline,
            extractor,
            generator,
            session_ttl: config.session_ttl,
        }
    }
}

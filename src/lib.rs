//! # College Companion Telegram Bot
//!
//! A Telegram bot for college students: study help, career guidance, campus
//! and social information, and an assignment solver that turns an uploaded
//! assignment into a PDF of answered questions.

pub mod bot;
pub mod circuit_breaker;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod formatter;
pub mod generator;
pub mod instance_manager;
pub mod localization;
pub mod ocr;
pub mod ocr_config;
pub mod ocr_errors;
pub mod pipeline;
pub mod prompts;
pub mod question_parser;
pub mod renderer;
pub mod session;
pub mod together;

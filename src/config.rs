//! # Bot Configuration
//!
//! Settings read from the environment (a `.env` file is loaded first by
//! `main`). Only the two credentials are required; everything else has a
//! default.

use std::path::PathBuf;
use std::time::Duration;

use crate::generator::DEFAULT_CONCURRENCY;
use crate::ocr_config::{OcrConfig, DEFAULT_LANGUAGES};

pub const DEFAULT_UPLOAD_FOLDER: &str = "./uploads";
pub const DEFAULT_GENERATION_MODEL: &str = "meta-llama/Llama-Vision-Free";
pub const DEFAULT_GENERATION_BASE_URL: &str = "https://api.together.xyz/v1";
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 30;

/// Configuration errors reported at startup
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} is not set in the environment variables"),
            ConfigError::Invalid { key, value } => write!(f, "{key} has an invalid value: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Sampling parameters and endpoint of the chat completion service
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub repetition_penalty: f32,
    pub stop: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GENERATION_BASE_URL.to_string(),
            model: DEFAULT_GENERATION_MODEL.to_string(),
            max_tokens: 5000,
            temperature: 0.7,
            top_p: 0.7,
            top_k: 50,
            repetition_penalty: 1.0,
            stop: vec!["<|eot_id|>".to_string(), "<|eom_id|>".to_string()],
            request_timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
        }
    }
}

/// Everything the bot needs at startup
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub together_api_key: String,
    pub upload_folder: PathBuf,
    pub generation: GenerationSettings,
    pub generation_concurrency: usize,
    pub session_ttl: chrono::Duration,
    pub ocr: OcrConfig,
}

impl BotConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let telegram_token =
            non_empty("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;
        let together_api_key =
            non_empty("TOGETHER_API_KEY").ok_or(ConfigError::Missing("TOGETHER_API_KEY"))?;

        let mut generation = GenerationSettings::default();
        if let Some(model) = non_empty("GENERATION_MODEL") {
            generation.model = model;
        }
        if let Some(base_url) = non_empty("GENERATION_BASE_URL") {
            generation.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = non_empty("GENERATION_TIMEOUT_SECS") {
            generation.request_timeout =
                Duration::from_secs(parse_positive("GENERATION_TIMEOUT_SECS", &secs)?);
        }

        let generation_concurrency = match non_empty("GENERATION_CONCURRENCY") {
            Some(value) => parse_positive("GENERATION_CONCURRENCY", &value)? as usize,
            None => DEFAULT_CONCURRENCY,
        };

        let session_ttl = match non_empty("SESSION_TTL_MINUTES") {
            Some(value) => parse_ttl_minutes(&value)?,
            None => chrono::Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
        };

        let ocr = OcrConfig::with_languages(
            non_empty("OCR_LANGUAGES").unwrap_or_else(|| DEFAULT_LANGUAGES.to_string()),
        );

        Ok(Self {
            telegram_token,
            together_api_key,
            upload_folder: PathBuf::from(
                non_empty("UPLOAD_FOLDER").unwrap_or_else(|| DEFAULT_UPLOAD_FOLDER.to_string()),
            ),
            generation,
            generation_concurrency,
            session_ttl,
            ocr,
        })
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

/// Minutes must fit a `chrono::Duration`; anything larger is rejected
fn parse_ttl_minutes(value: &str) -> Result<chrono::Duration, ConfigError> {
    let minutes = parse_positive("SESSION_TTL_MINUTES", value)?;
    i64::try_from(minutes)
        .ok()
        .and_then(chrono::Duration::try_minutes)
        .ok_or_else(|| ConfigError::Invalid {
            key: "SESSION_TTL_MINUTES",
            value: value.to_string(),
        })
}

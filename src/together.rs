//! # Together AI chat completion client
//!
//! [`TextGenerator`] backed by the OpenAI-compatible
//! `/chat/completions` endpoint of Together AI. Requests are sent without
//! streaming; the first choice's message content is the completion.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::GenerationSettings;
use crate::errors::GenerationError;
use crate::generator::TextGenerator;

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Request body of `POST /chat/completions`
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub repetition_penalty: f32,
    pub stop: Vec<String>,
    pub stream: bool,
}

impl ChatCompletionRequest {
    /// Single user-turn request with the configured sampling parameters
    pub fn user_prompt(settings: &GenerationSettings, prompt: &str) -> Self {
        Self {
            model: settings.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            top_p: settings.top_p,
            top_k: settings.top_k,
            repetition_penalty: settings.repetition_penalty,
            stop: settings.stop.clone(),
            stream: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice; a choice with null content counts as empty text
    pub fn into_completion(self) -> Result<String, GenerationError> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or(GenerationError::EmptyResponse)
    }
}

/// Together AI client
pub struct TogetherClient {
    http: reqwest::Client,
    api_key: String,
    settings: GenerationSettings,
}

impl TogetherClient {
    pub fn new(api_key: impl Into<String>, settings: GenerationSettings) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            settings,
        })
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url)
    }
}

#[async_trait]
impl TextGenerator for TogetherClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = ChatCompletionRequest::user_prompt(&self.settings, prompt);
        debug!(model = %self.settings.model, prompt_chars = prompt.len(), "Sending chat completion request");

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %message, "Chat completion request rejected");
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatCompletionResponse = response.json().await?;
        let completion = body.into_completion()?;
        debug!(completion_chars = completion.len(), "Chat completion received");
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_carries_sampling_parameters() {
        let settings = GenerationSettings::default();
        let request = ChatCompletionRequest::user_prompt(&settings, "What is a mutex?");
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "meta-llama/Llama-Vision-Free");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "What is a mutex?");
        assert_eq!(body["max_tokens"], 5000);
        assert_eq!(body["top_k"], 50);
        assert_eq!(body["stop"][1], "<|eom_id|>");
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_first_choice_is_the_completion() {
        let body: ChatCompletionResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"A lock."}},
                {"index":1,"message":{"role":"assistant","content":"ignored"}}]}"#,
        )
        .unwrap();
        assert_eq!(body.into_completion().unwrap(), "A lock.");
    }

    #[test]
    fn test_no_choices_is_an_error() {
        let body: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(body.into_completion(), Err(GenerationError::EmptyResponse));
    }

    #[test]
    fn test_null_content_is_empty_text() {
        let body: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(body.into_completion().unwrap(), "");
    }

    #[test]
    fn test_completions_url() {
        let settings = GenerationSettings {
            base_url: "http://localhost:9000/v1".to_string(),
            ..GenerationSettings::default()
        };
        let client = TogetherClient::new("key", settings).unwrap();
        assert_eq!(client.completions_url(), "http://localhost:9000/v1/chat/completions");
    }
}

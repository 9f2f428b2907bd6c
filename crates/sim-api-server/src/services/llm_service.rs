use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::services::chat_service::LlmProvider;
use crate::utils::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: usize,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    choices: Vec<ChoiceChunk>,
}

#[derive(Debug, Deserialize)]
struct ChoiceChunk {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat completions client.
///
/// Any provider with a `/chat/completions` endpoint works; only the base
/// URL and key change per provider.
#[derive(Clone)]
pub struct LlmService {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    default_temperature: f32,
    default_max_tokens: usize,
    provider_name: &'static str,
}

impl LlmService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        default_temperature: f32,
        default_max_tokens: usize,
        timeout_seconds: u64,
        provider_name: &'static str,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_seconds))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url,
            api_key,
            model,
            default_temperature,
            default_max_tokens,
            provider_name,
        }
    }

    fn build_messages(system_prompt: &str, prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if !system_prompt.is_empty() {
            messages.push(ChatMessage::system(system_prompt));
        }
        messages.push(ChatMessage::user(prompt));
        messages
    }

    async fn send_request(
        &self,
        messages: &[ChatMessage],
        temperature: Option<f32>,
        max_tokens: Option<usize>,
        stream: bool,
    ) -> Result<reqwest::Response, ApiError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: temperature.unwrap_or(self.default_temperature),
            max_tokens: max_tokens.unwrap_or(self.default_max_tokens),
            stream,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ApiError::LlmUnavailable(format!("{} request failed: {e}", self.provider_name))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::LlmUnavailable(format!(
                "{} API error ({status}): {body}",
                self.provider_name
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl LlmProvider for LlmService {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: &str,
        temperature: Option<f32>,
        max_tokens: Option<usize>,
    ) -> Result<String, ApiError> {
        let messages = Self::build_messages(system_prompt, prompt);
        debug!(
            provider = self.provider_name,
            messages = messages.len(),
            "Starting chat generation"
        );

        let response = self
            .send_request(&messages, temperature, max_tokens, false)
            .await?;

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            ApiError::LlmUnavailable(format!(
                "{} response parse failed: {e}",
                self.provider_name
            ))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ApiError::LlmUnavailable(format!("{} returned no choices", self.provider_name))
            })
    }

    async fn generate_stream(
        &self,
        prompt: &str,
        system_prompt: &str,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String, ApiError>> + Send>>, ApiError> {
        let messages = Self::build_messages(system_prompt, prompt);
        debug!(
            provider = self.provider_name,
            messages = messages.len(),
            "Starting chat stream"
        );

        let response = self.send_request(&messages, None, None, true).await?;
        let provider_name = self.provider_name;

        // Parse the SSE body: "data: {...}\n" lines terminated by
        // "data: [DONE]". Chunks can split mid-line, so buffer.
        let parsed_stream = async_stream::try_stream! {
            let mut bytes_stream = response.bytes_stream();
            let mut buffer = String::new();
            let mut done = false;

            while let Some(chunk) = bytes_stream.next().await {
                let bytes = chunk.map_err(|e| {
                    ApiError::LlmUnavailable(format!("{provider_name} stream error: {e}"))
                })?;
                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(pos) = buffer.find('\n') {
                    let line: String = buffer.drain(..=pos).collect();
                    let line = line.trim();

                    let Some(payload) = line.strip_prefix("data: ") else {
                        continue;
                    };
                    if payload == "[DONE]" {
                        done = true;
                        break;
                    }
                    if let Ok(parsed) = serde_json::from_str::<ChatCompletionChunk>(payload) {
                        if let Some(content) =
                            parsed.choices.first().and_then(|c| c.delta.content.clone())
                        {
                            if !content.is_empty() {
                                yield content;
                            }
                        }
                    }
                }

                if done {
                    break;
                }
            }
        };

        Ok(Box::pin(parsed_stream))
    }
}

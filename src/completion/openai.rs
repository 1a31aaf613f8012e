//! OpenAI-compatible chat completion client.

use super::{ChatMessage, CompletionClient, CompletionRequest};
use crate::config::CompletionConfig;
use crate::error::UpstreamError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Request body for `/v1/chat/completions`.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatResponse {
    /// Content of the first choice, if it carries any text.
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
    }
}

/// HTTP client for an OpenAI-style chat completion endpoint.
pub struct OpenAiClient {
    http: Client,
    url: String,
    api_key: String,
    model_id: String,
}

impl OpenAiClient {
    pub fn new(config: &CompletionConfig) -> Result<Self, UpstreamError> {
        let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: format!(
                "{}{}",
                config.base_url.trim_end_matches('/'),
                config.inference_route
            ),
            api_key: config.api_key.clone(),
            model_id: config.model_id.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, UpstreamError> {
        let body = ChatRequest {
            model: &self.model_id,
            messages: request.to_messages(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(
            model = %self.model_id,
            messages = body.messages.len(),
            max_tokens = body.max_tokens,
            "sending chat completion"
        );

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "(no body)".into());
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(format!("failed to parse response: {e}")))?;

        payload.into_text().ok_or(UpstreamError::EmptyResponse)
    }
}

//! Async completion client
//!
//! Talks to any OpenAI-compatible chat-completions endpoint (LM Studio,
//! llama.cpp server, vLLM, hosted APIs). One request, one attempt: no retry
//! and no timeout. A slow endpoint blocks its own run until the transport
//! resolves or errors.

use crate::core::config::CompletionConfig;
use crate::core::error::{PilotError, Result};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Path appended to the endpoint base URL
pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// How much of an error body to keep in messages
const ERROR_BODY_LIMIT: usize = 200;

/// Async client for the completion service
pub struct CompletionClient {
    client: Client,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl CompletionClient {
    /// Create a client with explicit request parameters
    pub fn new(config: &CompletionConfig) -> Self {
        Self {
            client: Client::new(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Full completions URL for an endpoint base URL
    pub fn completions_url(endpoint_url: &str) -> String {
        format!(
            "{}{}",
            endpoint_url.trim().trim_end_matches('/'),
            COMPLETIONS_PATH
        )
    }

    /// Build the request body for a system prompt and user text
    pub fn build_request(&self, system_prompt: &str, user_text: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system_prompt.into(),
                },
                Message {
                    role: "user".into(),
                    content: user_text.into(),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Send a completion request and return the first choice's text
    ///
    /// # Errors
    /// * `Transport` - bad URL, connection failure, or body read failure
    /// * `Protocol` - non-success status, or JSON without `choices[0].message.content`
    /// * `Decode` - body is not JSON
    pub async fn request(
        &self,
        endpoint_url: &str,
        system_prompt: &str,
        user_text: &str,
    ) -> Result<String> {
        let url = Self::completions_url(endpoint_url);
        let url = Url::parse(&url)
            .map_err(|e| PilotError::Transport(format!("invalid endpoint URL '{}': {}", url, e)))?;

        let request = self.build_request(system_prompt, user_text);
        debug!(%url, model = %self.model, "sending completion request");

        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| PilotError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PilotError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(PilotError::Protocol(format!(
                "API error {}: {}",
                status,
                truncate(&body, ERROR_BODY_LIMIT)
            )));
        }

        extract_content(&body)
    }
}

/// Pull `choices[0].message.content` out of a response body
pub fn extract_content(body: &str) -> Result<String> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| PilotError::Decode(e.to_string()))?;

    let completion: ChatResponse = serde_json::from_value(value).map_err(|e| {
        PilotError::Protocol(format!("unexpected response shape: {}", e))
    })?;

    completion
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| PilotError::Protocol("response has no choices".into()))
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// OpenAI-compatible chat-completions format
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

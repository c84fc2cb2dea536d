//! HTTP client for the external chat-completions API.
//!
//! [`CompletionClient`] is the production [`TextGenerator`]: it wraps a
//! `reqwest::Client` (built once, reused for the life of the process) and
//! sends the tip prompt as a single user message to an OpenRouter-style
//! `/chat/completions` endpoint. Transport failures, non-2xx statuses,
//! body-level error objects, and empty or malformed responses all map to
//! [`CapabilityError`] — the generator above never sees HTTP details.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::OPENROUTER_URL;
use crate::coach::capability::{
    CapabilityError, GenerateFuture, GenerationRequest, TextGenerator,
};

// ── Wire types ─────────────────────────────────────────────────────

/// Chat completion request body. Only the fields tip generation needs.
#[derive(Serialize, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A message in the conversation.
#[derive(Serialize, Debug)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Raw API response (internal deserialization target).
#[derive(Deserialize, Debug)]
struct RawCompletionResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<RawApiError>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawApiError {
    message: String,
}

/// Extract the generated text from a response body.
fn extract_content(body: &str) -> Result<String, CapabilityError> {
    let parsed: RawCompletionResponse = serde_json::from_str(body)
        .map_err(|e| CapabilityError::Unavailable(format!("malformed response: {e}")))?;

    if let Some(err) = parsed.error {
        return Err(CapabilityError::Unavailable(format!(
            "API error: {}",
            err.message
        )));
    }

    parsed
        .choices
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.message.content)
        .ok_or_else(|| CapabilityError::Unavailable("response carried no text".into()))
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for the chat-completions API.
pub struct CompletionClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl CompletionClient {
    /// Create a new client with the given API key and model.
    ///
    /// The transport-level timeout is a backstop; the generator applies its
    /// own, tighter per-call deadline.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, CapabilityError> {
        let client = reqwest::Client::builder()
            .user_agent("habitify/0.1")
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| {
                CapabilityError::Unavailable(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Send one chat completion request and return the generated text.
    async fn chat(&self, body: &ChatRequest) -> Result<String, CapabilityError> {
        debug!(
            model = %body.model,
            max_tokens = body.max_tokens,
            temperature = body.temperature,
            "completion request"
        );
        let start = Instant::now();

        let resp = self
            .client
            .post(OPENROUTER_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CapabilityError::Timeout
                } else {
                    CapabilityError::Unavailable(format!("request failed: {e}"))
                }
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            CapabilityError::Unavailable(format!("failed to read response: {e}"))
        })?;

        debug!(
            status = %status,
            elapsed_s = start.elapsed().as_secs_f64(),
            bytes = text.len(),
            "completion response"
        );

        if !status.is_success() {
            return Err(CapabilityError::Unavailable(format!(
                "HTTP {status}: {text}"
            )));
        }

        extract_content(&text)
    }
}

impl TextGenerator for CompletionClient {
    fn complete(&self, request: GenerationRequest) -> GenerateFuture<'_> {
        Box::pin(async move {
            let body = ChatRequest {
                model: self.model.clone(),
                messages: vec![ChatMessage::user(&request.prompt)],
                max_tokens: request.max_tokens,
                temperature: request.temperature,
            };
            self.chat(&body).await
        })
    }
}

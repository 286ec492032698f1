// src/services/deepseek.rs

//! DeepSeek (OpenAI-compatible) chat-completion client.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;
use crate::models::AnalyzerConfig;
use crate::utils::http::{create_client, endpoint, send_with_retry, transport_policy};
use crate::utils::retry::RetryPolicy;
use crate::utils::truncate;

const USER_AGENT: &str = concat!("toolwatch/", env!("CARGO_PKG_VERSION"));

/// Failure of a single call, as seen after transport-level retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for CallError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CallError::Timeout
        } else if e.is_decode() {
            CallError::Malformed(e.to_string())
        } else {
            CallError::Transport(e.to_string())
        }
    }
}

/// Chat-completion provider used by the analyzer.
pub trait ChatBackend {
    /// Cheap authenticated read used to validate the key.
    ///
    /// `Ok(None)` means the key is valid but the model list was unreadable.
    fn list_models(&self) -> std::result::Result<Option<Vec<String>>, CallError>;

    /// Run one completion and return the first choice's text.
    fn complete(&self, request: &ChatRequest) -> std::result::Result<String, CallError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// Blocking client holding its own HTTP session and key.
pub struct DeepSeekClient {
    client: Client,
    api_base: String,
    api_key: String,
    request_timeout: Duration,
    validate_timeout: Duration,
    transport: RetryPolicy,
}

impl DeepSeekClient {
    pub fn new(api_key: impl Into<String>, config: &AnalyzerConfig) -> Result<Self> {
        let client = create_client(USER_AGENT, config.request_timeout())?;
        // Validates the base URL once so later joins cannot fail on it.
        endpoint(&config.api_base, "models")?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            api_key: api_key.into(),
            request_timeout: config.request_timeout(),
            validate_timeout: config.validate_timeout(),
            transport: transport_policy(
                config.transport_retries,
                Duration::from_secs(config.transport_backoff_secs),
            ),
        })
    }

    fn send(&self, request: RequestBuilder) -> std::result::Result<Response, CallError> {
        let request = request.bearer_auth(&self.api_key).build()?;
        Ok(send_with_retry(&self.client, request, self.transport)?)
    }

    fn url(&self, path: &str) -> std::result::Result<url::Url, CallError> {
        endpoint(&self.api_base, path).map_err(|e| CallError::Transport(e.to_string()))
    }

    fn error_status(response: Response) -> CallError {
        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        CallError::Status {
            status,
            body: truncate(&body, 200),
        }
    }
}

impl ChatBackend for DeepSeekClient {
    fn list_models(&self) -> std::result::Result<Option<Vec<String>>, CallError> {
        let request = self.client.get(self.url("models")?).timeout(self.validate_timeout);
        let response = self.send(request)?;
        if !response.status().is_success() {
            return Err(Self::error_status(response));
        }

        match response.json::<ModelList>() {
            Ok(list) => Ok(Some(list.data.into_iter().map(|m| m.id).collect())),
            Err(e) => {
                log::warn!("Could not parse model list: {}", e);
                Ok(None)
            }
        }
    }

    fn complete(&self, request: &ChatRequest) -> std::result::Result<String, CallError> {
        let builder = self
            .client
            .post(self.url("chat/completions")?)
            .timeout(self.request_timeout)
            .json(request);
        let response = self.send(builder)?;
        if !response.status().is_success() {
            return Err(Self::error_status(response));
        }

        let text = response.text()?;
        log::debug!("Completion response: {}", truncate(&text, 200));
        let body: ChatResponse =
            serde_json::from_str(&text).map_err(|e| CallError::Malformed(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CallError::Malformed("no choices[0].message.content".to_string()))
    }
}

//! ClaudeApiCapability - Direct REST API implementation of the generative
//! capability.
//!
//! Calls the Claude Messages API without CLI dependency.
//! Configuration priority: ~/.config/parley/secret.json > environment
//! variables.

use async_trait::async_trait;
use reqwest::{header::HeaderValue, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::capability::{CapabilityError, GenerativeCapability};
use crate::config;

const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Capability implementation that talks to the Claude HTTP API.
#[derive(Clone)]
pub struct ClaudeApiCapability {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeApiCapability {
    /// Creates a new capability with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Loads configuration from ~/.config/parley/secret.json or environment
    /// variables.
    ///
    /// Priority:
    /// 1. ~/.config/parley/secret.json
    /// 2. Environment variables (ANTHROPIC_API_KEY, CLAUDE_MODEL_NAME)
    ///
    /// Model name defaults to `claude-sonnet-4-20250514` if not specified.
    pub fn try_from_env() -> Result<Self, CapabilityError> {
        if let Ok(secret_config) = config::load_secret_config() {
            if let Some(anthropic) = secret_config.anthropic {
                let model = anthropic
                    .model_name
                    .unwrap_or_else(|| DEFAULT_CLAUDE_MODEL.to_string());
                return Ok(Self::new(anthropic.api_key, model));
            }
        }

        let api_key = env::var("ANTHROPIC_API_KEY").map_err(|_| {
            CapabilityError::Config(
                "ANTHROPIC_API_KEY not found in ~/.config/parley/secret.json or environment variables"
                    .into(),
            )
        })?;

        let model = env::var("CLAUDE_MODEL_NAME").unwrap_or_else(|_| DEFAULT_CLAUDE_MODEL.into());
        Ok(Self::new(api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    async fn send_request(&self, body: &CreateMessageRequest) -> Result<String, CapabilityError> {
        let response = self
            .client
            .post(BASE_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| CapabilityError::Transport {
                message: format!("Claude API request failed: {err}"),
                is_retryable: err.is_connect() || err.is_timeout(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Claude error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: CreateMessageResponse = response.json().await.map_err(|err| {
            CapabilityError::EmptyReply(format!("Failed to parse Claude response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl GenerativeCapability for ClaudeApiCapability {
    fn name(&self) -> &str {
        "claude-api"
    }

    async fn complete(&self, prompt: String) -> Result<String, CapabilityError> {
        if prompt.trim().is_empty() {
            return Err(CapabilityError::EmptyReply(
                "Claude prompt must include text".into(),
            ));
        }

        let request = CreateMessageRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens: self.max_tokens,
        };

        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct CreateMessageRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlockResponse>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlockResponse {
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    r#type: String,
    message: String,
}

fn extract_text_response(response: CreateMessageResponse) -> Result<String, CapabilityError> {
    response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlockResponse::Text { text } => Some(text),
        })
        .ok_or_else(|| {
            CapabilityError::EmptyReply(
                "Claude API returned no text in the response content".into(),
            )
        })
}

fn map_http_error(
    status: StatusCode,
    body: String,
    retry_after: Option<Duration>,
) -> CapabilityError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.clone());

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    CapabilityError::Http {
        status_code: Some(status.as_u16()),
        message,
        is_retryable,
        retry_after,
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    // Retry-After HTTP-date parsing is omitted for simplicity
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_errors_are_retryable() {
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error": {"type": "rate_limit_error", "message": "slow down"}}"#.to_string(),
            Some(Duration::from_secs(3)),
        );

        assert!(err.is_retryable());
        match err {
            CapabilityError::Http {
                status_code,
                message,
                retry_after,
                ..
            } => {
                assert_eq!(status_code, Some(429));
                assert_eq!(message, "slow down");
                assert_eq!(retry_after, Some(Duration::from_secs(3)));
            }
            other => panic!("Expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let err = map_http_error(
            StatusCode::UNAUTHORIZED,
            "not json".to_string(),
            None,
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn retry_after_seconds_are_parsed() {
        let header = HeaderValue::from_static("7");
        assert_eq!(
            parse_retry_after(Some(&header)),
            Some(Duration::from_secs(7))
        );
        let date_header = HeaderValue::from_static("Wed, 21 Oct 2026 07:28:00 GMT");
        assert_eq!(parse_retry_after(Some(&date_header)), None);
    }
}

//! Chat completion client for the upstream model API.
//!
//! One request per call, no streaming and no retries. The client never
//! touches a cache; callers decide what to store.

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use tokio::time::timeout;

use crate::config::{APP_TITLE, EndpointConfig, UpstreamConfig};
use crate::types::{ChatMessage, ChatRequest, ChatResponse};

/// Longest slice of an error body kept for logs and error values.
const MAX_ERROR_BODY: usize = 300;

/// Failures talking to the upstream API.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream API key is missing or still set to a placeholder")]
    Unauthenticated,

    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),

    #[error("upstream returned no usable text")]
    EmptyResponse,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// True when `key` looks like an unset value copied from a sample `.env`.
pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    if key.is_empty() {
        return true;
    }
    let lower = key.to_ascii_lowercase();
    lower.starts_with("your")
        || lower == "changeme"
        || lower == "placeholder"
        || key.chars().all(|c| matches!(c, 'x' | 'X' | '*'))
}

/// Client for an OpenAI-style `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http_client: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let http_client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Whether a usable API key is configured.
    pub fn has_credentials(&self) -> bool {
        self.api_key().is_some()
    }

    fn api_key(&self) -> Option<&str> {
        self.config.usable_api_key()
    }

    /// Send one completion request and return the first choice's text.
    ///
    /// The credential check happens before any network activity, and the
    /// whole exchange (connect, send, read body) is bounded by
    /// `settings.timeout`.
    pub async fn complete(
        &self,
        settings: &EndpointConfig,
        system: &str,
        user: &str,
    ) -> Result<String, UpstreamError> {
        let api_key = self.api_key().ok_or(UpstreamError::Unauthenticated)?;

        let request = ChatRequest {
            model: &settings.model,
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        };

        let mut builder = self
            .http_client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request);

        if let Some(ref base_url) = self.config.public_base_url {
            builder = builder
                .header("HTTP-Referer", base_url)
                .header("X-Title", APP_TITLE);
        }

        tracing::debug!(model = %settings.model, "Sending completion request");
        let started = Instant::now();

        let limit = settings.timeout;
        let classify = move |e: reqwest::Error| {
            if e.is_timeout() {
                UpstreamError::Timeout(limit)
            } else {
                UpstreamError::Network(e)
            }
        };

        // Status first: an error response whose body fails to arrive is still
        // a status error.
        let exchange = async move {
            let response = builder.send().await.map_err(classify)?;
            let status = response.status();
            if !status.is_success() {
                let body: String = response
                    .text()
                    .await
                    .unwrap_or_default()
                    .chars()
                    .take(MAX_ERROR_BODY)
                    .collect();
                tracing::warn!("Upstream request failed: {} {}", status, body);
                return Err(UpstreamError::Status { status, body });
            }
            let body = response.text().await.map_err(classify)?;
            Ok::<_, UpstreamError>(body)
        };

        let body = timeout(limit, exchange)
            .await
            .map_err(|_| UpstreamError::Timeout(limit))??;

        let response: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("Failed to parse upstream response: {}", e);
            UpstreamError::EmptyResponse
        })?;

        let Some(text) = response.first_text().map(str::to_string) else {
            tracing::warn!(
                finish_reason = response.finish_reason().unwrap_or("none"),
                "Upstream returned no text"
            );
            return Err(UpstreamError::EmptyResponse);
        };

        tracing::debug!(
            model = response.model.as_deref().unwrap_or(settings.model.as_str()),
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = text.len(),
            "Completion received"
        );

        Ok(text)
    }
}

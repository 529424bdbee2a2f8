//! Outbound message relay: one JSON POST per `send_message` call.
//!
//! DESIGN
//! ======
//! The webhook (an n8n workflow in production) is opaque: we send
//! `{ phone, message }` and forward whatever JSON it answers with. There is
//! no retry here; a failed delivery is reported to the caller once.

use serde::Serialize;
use serde_json::Value;

use crate::config::UpstreamTimeouts;
use crate::error::ErrorCode;

// =============================================================================
// TYPES
// =============================================================================

/// Request body sent to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub phone: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("webhook request failed: {0}")]
    Request(String),
    #[error("webhook request timed out")]
    Timeout,
    #[error("webhook failed with status: {status}")]
    Status { status: u16, body: String },
    #[error("webhook response is not JSON: {0}")]
    Parse(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for WebhookError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_WEBHOOK_REQUEST",
            Self::Timeout => "E_WEBHOOK_TIMEOUT",
            Self::Status { .. } => "E_WEBHOOK_STATUS",
            Self::Parse(_) => "E_WEBHOOK_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Timeout | Self::Status { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// RELAY TRAIT
// =============================================================================

/// Delivers one outbound message. Enables mocking in tests.
#[async_trait::async_trait]
pub trait MessageRelay: Send + Sync {
    /// Deliver `msg` and return the webhook's JSON response body.
    ///
    /// # Errors
    ///
    /// Returns a [`WebhookError`] on transport failure, timeout, non-2xx
    /// status, or a body that is not valid JSON.
    async fn send(&self, msg: &OutboundMessage) -> Result<Value, WebhookError>;
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct WebhookClient {
    http: reqwest::Client,
    url: String,
}

impl WebhookClient {
    /// # Errors
    ///
    /// Returns [`WebhookError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(url: String, timeouts: UpstreamTimeouts) -> Result<Self, WebhookError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| WebhookError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, url })
    }
}

#[async_trait::async_trait]
impl MessageRelay for WebhookClient {
    async fn send(&self, msg: &OutboundMessage) -> Result<Value, WebhookError> {
        let response = self
            .http
            .post(&self.url)
            .json(msg)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(WebhookError::Status { status: status.as_u16(), body: text });
        }

        parse_response(&text)
    }
}

fn transport_error(err: reqwest::Error) -> WebhookError {
    if err.is_timeout() { WebhookError::Timeout } else { WebhookError::Request(err.to_string()) }
}

fn parse_response(json: &str) -> Result<Value, WebhookError> {
    serde_json::from_str(json).map_err(|e| WebhookError::Parse(e.to_string()))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

//! Client facade for the gateway HTTP contract.
//!
//! The only component the presentation layer talks to. It holds no
//! credential and does no polling of its own; `send_message` simply blocks
//! until the gateway's relay responds or errors. As observed by a caller,
//! one relay call moves `idle → pending → resolved | timed_out | failed`
//! and is terminal in all three outcomes; retry after a timeout is an
//! explicit, separate call, never automatic.

use crate::chat::Turn;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Must outlast the gateway's relay path (~30 s polling ceiling).
const HTTP_TIMEOUT_SECS: u64 = 60;

/// Uniform failure for every facade operation: a local network failure or a
/// non-2xx response, carrying the human-readable message extracted from the
/// response body when present, or a generic fallback otherwise.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    /// HTTP status of the failed response; `None` for transport failures.
    pub status: Option<u16>,
    pub message: String,
}

impl ClientError {
    /// The relay gave up waiting. Callers can offer "try again" instead of
    /// "something is broken".
    pub fn is_timeout(&self) -> bool {
        self.status == Some(408)
    }

    fn fallback(message: &str) -> Self {
        Self {
            status: None,
            message: message.to_string(),
        }
    }
}

pub struct ChatClient {
    base_url: String,
    client: Client,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Open a new conversation session; returns its opaque id.
    pub async fn open_session(&self) -> Result<String, ClientError> {
        const FALLBACK: &str = "Failed to create chat session";

        let response = self
            .client
            .post(format!("{}/sessions", self.base_url))
            .send()
            .await
            .map_err(|_| ClientError::fallback(FALLBACK))?;
        let body = Self::expect_ok(response, FALLBACK).await?;

        body.get("sessionId")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| ClientError::fallback(FALLBACK))
    }

    /// Relay a message and block until the assistant's reply (or an error)
    /// comes back from the gateway.
    pub async fn send_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<String, ClientError> {
        const FALLBACK: &str = "Failed to send message";

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .json(&serde_json::json!({"sessionId": session_id, "message": message}))
            .send()
            .await
            .map_err(|_| ClientError::fallback(FALLBACK))?;
        let body = Self::expect_ok(response, FALLBACK).await?;

        body.get("response")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| ClientError::fallback(FALLBACK))
    }

    /// Fetch the chronological transcript of a session.
    pub async fn history(&self, session_id: &str) -> Result<Vec<Turn>, ClientError> {
        const FALLBACK: &str = "Failed to get message history";

        let response = self
            .client
            .get(format!("{}/history", self.base_url))
            .query(&[("sessionId", session_id)])
            .send()
            .await
            .map_err(|_| ClientError::fallback(FALLBACK))?;
        let body = Self::expect_ok(response, FALLBACK).await?;

        let history = body.get("history").cloned().unwrap_or(Value::Null);
        serde_json::from_value(history).map_err(|_| ClientError::fallback(FALLBACK))
    }

    /// Success bodies pass through as JSON; non-2xx responses become a
    /// `ClientError` with the body's `error` message when present.
    async fn expect_ok(response: reqwest::Response, fallback: &str) -> Result<Value, ClientError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|_| ClientError::fallback(fallback));
        }

        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned))
            .unwrap_or_else(|| fallback.to_string());

        Err(ClientError {
            status: Some(status.as_u16()),
            message,
        })
    }
}

//! Session orchestration: open a conversation, relay a message through an
//! asynchronous assistant run, fetch the transcript.
//!
//! This is the only stateful-looking part of the system, and even here the
//! state lives upstream; every operation is a stateless sequence of calls
//! against [`AssistantApi`]. The relay's poll loop is the single place a
//! request suspends repeatedly, and it is hard-bounded by [`PollPolicy`].

use crate::assistant::{AssistantApi, Role, RunStatus};
use crate::config::PollConfig;
use crate::error::{Result, UpstreamError, ValidationError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Longest accepted user message, in characters after trimming.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// One message exchange in a session, oldest-first in history output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
}

/// Run-status polling bounds. Injected so tests can run the loop with a
/// zero interval instead of real waits.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_attempts: 60,
        }
    }
}

impl From<PollConfig> for PollPolicy {
    fn from(config: PollConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.interval_ms),
            max_attempts: config.max_attempts,
        }
    }
}

/// The three operations behind the gateway endpoints.
pub struct ChatService {
    api: Arc<dyn AssistantApi>,
    poll: PollPolicy,
}

impl ChatService {
    pub fn new(api: Arc<dyn AssistantApi>) -> Self {
        Self::with_poll_policy(api, PollPolicy::default())
    }

    pub fn with_poll_policy(api: Arc<dyn AssistantApi>, poll: PollPolicy) -> Self {
        Self { api, poll }
    }

    /// Allocate a new remote session and return its opaque id.
    ///
    /// The caller owns the id from here on; this system never destroys
    /// remote sessions.
    pub async fn open_session(&self) -> Result<String> {
        self.api.create_thread().await
    }

    /// Submit a user message and wait for the assistant's reply.
    ///
    /// Appends the trimmed text as a user turn, starts a run, polls it to a
    /// terminal state, then returns the newest assistant turn's text. The
    /// user turn is not rolled back when a later step fails or times out,
    /// and an abandoned run is not cancelled remotely, so the external
    /// transcript keeps the attempted message.
    pub async fn relay_message(&self, session_id: &str, text: &str) -> Result<String> {
        if session_id.is_empty() {
            return Err(ValidationError::MissingSession.into());
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        let len = text.chars().count();
        if len > MAX_MESSAGE_CHARS {
            return Err(ValidationError::MessageTooLong {
                len,
                max: MAX_MESSAGE_CHARS,
            }
            .into());
        }

        self.api.append_user_message(session_id, text).await?;
        let run = self.api.create_run(session_id).await?;
        self.wait_for_run(session_id, &run.id).await?;
        self.latest_assistant_reply(session_id).await
    }

    /// Poll the run until it leaves the pending states. Returns `Ok(())`
    /// only for a completed run.
    async fn wait_for_run(&self, session_id: &str, run_id: &str) -> Result<()> {
        for attempt in 0..self.poll.max_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.poll.interval).await;
            }

            let run = self.api.run_status(session_id, run_id).await?;
            match run.status {
                RunStatus::Queued | RunStatus::InProgress => {}
                RunStatus::Completed => return Ok(()),
                status => return Err(UpstreamError::RunEnded { status }.into()),
            }
        }

        // Stop waiting locally; the remote run keeps going on its own.
        Err(crate::error::ChatError::Timeout {
            attempts: self.poll.max_attempts,
        })
    }

    /// Newest assistant turn's text, selected by creation time so the
    /// result does not depend on the order the service lists messages in.
    async fn latest_assistant_reply(&self, session_id: &str) -> Result<String> {
        let messages = self.api.list_messages(session_id).await?;
        messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .max_by_key(|m| m.created_at)
            .and_then(|m| m.text_content())
            .map(str::to_owned)
            .ok_or_else(|| UpstreamError::NoAssistantReply.into())
    }

    /// Full transcript of a session, re-ordered chronologically (the
    /// service lists newest first). Non-text content degrades to an empty
    /// string rather than failing the whole fetch.
    pub async fn history(&self, session_id: &str) -> Result<Vec<Turn>> {
        if session_id.is_empty() {
            return Err(ValidationError::MissingSession.into());
        }

        let mut turns: Vec<Turn> = self
            .api
            .list_messages(session_id)
            .await?
            .iter()
            .map(|m| Turn {
                role: m.role,
                content: m.text_content().unwrap_or_default().to_owned(),
                timestamp: m.created_at,
            })
            .collect();
        turns.sort_by_key(|t| t.timestamp);
        Ok(turns)
    }
}

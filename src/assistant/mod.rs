//! Client for the hosted-assistant service.
//!
//! The service is a black box reached over HTTP: create a thread, append a
//! message, start a run, poll the run, list the thread's messages. The
//! orchestration layer only ever talks to it through the [`AssistantApi`]
//! trait so tests can substitute a scripted fake.

pub mod client;
pub mod scrub;
pub mod types;

pub use client::AssistantClient;
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use types::{ContentBlock, MessageList, Role, Run, RunStatus, TextValue, Thread, ThreadMessage};

use crate::error::Result;
use async_trait::async_trait;

/// The five calls this system sequences against the assistant service.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Allocate a new conversation thread; returns its opaque id.
    async fn create_thread(&self) -> Result<String>;

    /// Append a user message to an existing thread.
    async fn append_user_message(&self, thread_id: &str, text: &str) -> Result<()>;

    /// Start an assistant run against the thread.
    async fn create_run(&self, thread_id: &str) -> Result<Run>;

    /// Fetch the current state of a run.
    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// List the thread's messages as returned by the service (newest first).
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>>;
}

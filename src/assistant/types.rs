//! Wire types for the hosted-assistant service (threads / messages / runs).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a turn. The service only ever emits these two roles on a
/// conversation thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Lifecycle state of one asynchronous assistant run.
///
/// `Queued` and `InProgress` are the only pending states; `Completed` is the
/// only success. Every other terminal state is treated uniformly as an
/// upstream failure. Local poll timeout is synthesized by the relay and is
/// deliberately not a wire status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    Cancelling,
    Cancelled,
    Expired,
    RequiresAction,
    Incomplete,
    Unknown,
}

impl From<String> for RunStatus {
    fn from(wire: String) -> Self {
        match wire.as_str() {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "completed" => RunStatus::Completed,
            "failed" => RunStatus::Failed,
            "cancelling" => RunStatus::Cancelling,
            "cancelled" => RunStatus::Cancelled,
            "expired" => RunStatus::Expired,
            "requires_action" => RunStatus::RequiresAction,
            "incomplete" => RunStatus::Incomplete,
            _ => RunStatus::Unknown,
        }
    }
}

impl RunStatus {
    /// Keep-polling states. Everything else ends the poll loop.
    pub fn is_pending(self) -> bool {
        matches!(self, RunStatus::Queued | RunStatus::InProgress)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Expired => "expired",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// One assistant run as returned by create-run and run-status calls.
#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
}

/// One content block of a thread message. Only plain text carries a value;
/// attachments and structured blocks degrade to `Unsupported`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: TextValue },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextValue {
    pub value: String,
}

/// One message on a thread, as listed by the service (newest first).
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMessage {
    pub role: Role,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    pub created_at: i64,
}

impl ThreadMessage {
    /// Text of the first plain-text content block, if any.
    pub fn text_content(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.value.as_str()),
            ContentBlock::Unsupported => None,
        })
    }
}

/// Envelope for the list-messages call.
#[derive(Debug, Deserialize)]
pub struct MessageList {
    pub data: Vec<ThreadMessage>,
}

/// Envelope for the create-thread call.
#[derive(Debug, Deserialize)]
pub struct Thread {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_status_deserializes_snake_case() {
        let run: Run = serde_json::from_str(r#"{"id":"run_1","status":"in_progress"}"#).unwrap();
        assert_eq!(run.status, RunStatus::InProgress);
        assert!(run.status.is_pending());
    }

    #[test]
    fn unrecognized_run_status_maps_to_unknown() {
        let run: Run = serde_json::from_str(r#"{"id":"run_1","status":"paused"}"#).unwrap();
        assert_eq!(run.status, RunStatus::Unknown);
        assert!(!run.status.is_pending());
    }

    #[test]
    fn completed_is_not_pending() {
        assert!(!RunStatus::Completed.is_pending());
        assert!(RunStatus::Queued.is_pending());
    }

    #[test]
    fn message_text_content_reads_text_block() {
        let json = r#"{
            "role": "assistant",
            "content": [{"type": "text", "text": {"value": "Hi!", "annotations": []}}],
            "created_at": 1700000000
        }"#;
        let msg: ThreadMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.text_content(), Some("Hi!"));
    }

    #[test]
    fn non_text_block_degrades_to_none() {
        let json = r#"{
            "role": "assistant",
            "content": [{"type": "image_file", "image_file": {"file_id": "file_1"}}],
            "created_at": 1700000000
        }"#;
        let msg: ThreadMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.text_content(), None);
    }

    #[test]
    fn message_without_content_deserializes() {
        let msg: ThreadMessage =
            serde_json::from_str(r#"{"role":"user","created_at":1}"#).unwrap();
        assert!(msg.content.is_empty());
        assert_eq!(msg.text_content(), None);
    }

    #[test]
    fn message_list_preserves_upstream_order() {
        let json = r#"{"data":[
            {"role":"assistant","content":[],"created_at":3},
            {"role":"user","content":[],"created_at":2},
            {"role":"user","content":[],"created_at":1}
        ]}"#;
        let list: MessageList = serde_json::from_str(json).unwrap();
        let stamps: Vec<i64> = list.data.iter().map(|m| m.created_at).collect();
        assert_eq!(stamps, vec![3, 2, 1]);
    }

    #[test]
    fn run_status_displays_wire_name() {
        assert_eq!(RunStatus::RequiresAction.to_string(), "requires_action");
        assert_eq!(RunStatus::Completed.to_string(), "completed");
    }
}

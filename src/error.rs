use crate::assistant::RunStatus;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `foliochat`.
///
/// Each variant maps to one HTTP response class at the gateway boundary:
/// config and upstream failures become generic 500s (detail stays in the
/// server log), validation failures are surfaced verbatim as 400s, and a
/// polling timeout becomes a 408 so callers can offer "try again"
/// instead of "something is broken".
#[derive(Debug, Error)]
pub enum ChatError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Caller input ─────────────────────────────────────────────────────
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    // ── Assistant service ────────────────────────────────────────────────
    #[error("upstream: {0}")]
    Upstream(#[from] UpstreamError),

    // ── Locally synthesized poll timeout ─────────────────────────────────
    #[error("assistant run still pending after {attempts} status checks")]
    Timeout { attempts: u32 },
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("assistant API key is not configured")]
    MissingApiKey,

    #[error("assistant id is not configured")]
    MissingAssistantId,

    #[error("failed to load config: {0}")]
    Load(String),
}

// ─── Validation errors ──────────────────────────────────────────────────────

/// Caller-input failures. These messages are safe to return verbatim.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Session ID is required")]
    MissingSession,

    #[error("Message must be a non-empty string")]
    EmptyMessage,

    #[error("Message too long. Maximum {max} characters.")]
    MessageTooLong { len: usize, max: usize },
}

// ─── Upstream errors ────────────────────────────────────────────────────────

/// The assistant service returned a non-success status, an unexpected
/// shape, or a terminal run state other than completed. Messages here are
/// already sanitized (see `assistant::scrub`) and go to the server log;
/// callers only ever see a generic body.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("assistant service request failed: {0}")]
    Transport(String),

    #[error("assistant service error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("assistant service response decode failed: {0}")]
    Decode(String),

    #[error("assistant run ended with status {status}")]
    RunEnded { status: RunStatus },

    #[error("run completed without an assistant reply")]
    NoAssistantReply,
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, ChatError>;

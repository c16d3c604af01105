use super::AppState;
use crate::error::ChatError;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;

/// POST /messages request body. Fields are optional so an absent field
/// reaches the validation path instead of a serde rejection.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RelayBody {
    pub session_id: Option<String>,
    pub message: Option<String>,
}

/// GET /history query params
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HistoryQuery {
    pub session_id: Option<String>,
}

/// GET /health — always public (no secrets leaked)
pub(super) async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// POST /sessions — allocate a new conversation session
pub(super) async fn handle_open_session(State(state): State<AppState>) -> impl IntoResponse {
    match state.chat.open_session().await {
        Ok(session_id) => {
            tracing::info!("opened chat session {session_id}");
            let body = serde_json::json!({"sessionId": session_id});
            (StatusCode::OK, Json(body))
        }
        Err(e) => error_response(&e, "open session", "Failed to create chat session"),
    }
}

/// POST /messages — relay a message and wait for the assistant reply
pub(super) async fn handle_relay_message(
    State(state): State<AppState>,
    body: Result<Json<RelayBody>, axum::extract::rejection::JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => {
            let err = serde_json::json!({
                "error": format!(
                    "Invalid JSON: {e}. Expected: {{\"sessionId\": \"...\", \"message\": \"...\"}}"
                )
            });
            return (StatusCode::BAD_REQUEST, Json(err));
        }
    };

    let session_id = body.session_id.unwrap_or_default();
    let message = body.message.unwrap_or_default();

    match state.chat.relay_message(&session_id, &message).await {
        Ok(reply) => {
            let body = serde_json::json!({"response": reply});
            (StatusCode::OK, Json(body))
        }
        Err(e) => error_response(&e, "relay message", "Failed to send message"),
    }
}

/// GET /history — chronological transcript of a session
pub(super) async fn handle_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let session_id = query.session_id.unwrap_or_default();

    match state.chat.history(&session_id).await {
        Ok(turns) => {
            let body = serde_json::json!({"history": turns});
            (StatusCode::OK, Json(body))
        }
        Err(e) => error_response(&e, "fetch history", "Failed to get message history"),
    }
}

/// Translate a `ChatError` into the one structured JSON error response per
/// status class. Validation messages are caller-safe and returned verbatim;
/// config and upstream detail stays in the server log.
fn error_response(
    err: &ChatError,
    op: &str,
    fallback: &str,
) -> (StatusCode, Json<serde_json::Value>) {
    match err {
        ChatError::Validation(v) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": v.to_string()})),
        ),
        ChatError::Timeout { .. } => {
            tracing::warn!("{op} gave up waiting: {err}");
            (
                StatusCode::REQUEST_TIMEOUT,
                Json(serde_json::json!({"error": "Request timeout. Please try again."})),
            )
        }
        ChatError::Config(_) => {
            tracing::error!("{op} failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Missing assistant configuration"})),
            )
        }
        ChatError::Upstream(_) => {
            tracing::error!("{op} failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": fallback})),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, UpstreamError, ValidationError};

    fn status_of(err: &ChatError) -> StatusCode {
        error_response(err, "test", "fallback").0
    }

    #[test]
    fn validation_maps_to_400() {
        let err = ChatError::Validation(ValidationError::EmptyMessage);
        assert_eq!(status_of(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn timeout_maps_to_408() {
        let err = ChatError::Timeout { attempts: 60 };
        assert_eq!(status_of(&err), StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn config_and_upstream_map_to_500() {
        let config = ChatError::Config(ConfigError::MissingApiKey);
        let upstream = ChatError::Upstream(UpstreamError::NoAssistantReply);
        assert_eq!(status_of(&config), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_of(&upstream), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn upstream_body_hides_detail_behind_fallback() {
        let err = ChatError::Upstream(UpstreamError::Api {
            status: 500,
            detail: "internal upstream detail".into(),
        });
        let (_, Json(body)) = error_response(&err, "test", "Failed to send message");
        assert_eq!(body["error"], "Failed to send message");
    }

    #[test]
    fn validation_body_is_verbatim() {
        let err = ChatError::Validation(ValidationError::MissingSession);
        let (_, Json(body)) = error_response(&err, "test", "fallback");
        assert_eq!(body["error"], "Session ID is required");
    }
}

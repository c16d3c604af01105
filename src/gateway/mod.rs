//! Axum HTTP gateway exposing the chat orchestration endpoints.
//!
//! Three request-scoped, stateless handlers plus a liveness probe:
//! - `POST /sessions` — open a conversation session
//! - `POST /messages` — relay a message and wait for the assistant reply
//! - `GET  /history`  — fetch the chronological transcript
//! - `GET  /health`   — liveness
//!
//! The browser widget is served from a different origin, so CORS is open to
//! any origin and preflight requests are answered with an empty 200.

mod handlers;

use handlers::{handle_health, handle_history, handle_open_session, handle_relay_message};

use crate::assistant::{AssistantApi, AssistantClient};
use crate::chat::{ChatService, PollPolicy};
use crate::config::Config;
use anyhow::{Context, Result};
use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (64KB) — prevents memory exhaustion
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout; must outlast the relay's ~30 s polling ceiling
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
}

/// Run the HTTP gateway on the configured bind address.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    run_gateway_with_listener(listener, config).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    config: Config,
) -> Result<()> {
    let display_addr = listener
        .local_addr()
        .context("read gateway local address")?
        .to_string();

    if config.api_key.is_none() || config.assistant_id.is_none() {
        tracing::warn!(
            "assistant credentials not configured; chat requests will fail until \
             OPENAI_API_KEY and ASSISTANT_ID are set"
        );
    }

    let api: Arc<dyn AssistantApi> = Arc::new(AssistantClient::new(&config));
    let chat = Arc::new(ChatService::with_poll_policy(
        api,
        PollPolicy::from(config.poll),
    ));
    let state = AppState { chat };

    print_gateway_banner(&display_addr);

    let app = build_app(state);
    axum::serve(listener, app)
        .await
        .context("serve HTTP gateway")?;

    Ok(())
}

fn print_gateway_banner(display_addr: &str) {
    println!("Chat gateway listening on {display_addr}");
    println!("  POST /sessions");
    println!("  POST /messages");
    println!("  GET  /history");
    println!("  GET  /health");
}

fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/sessions", post(handle_open_session))
        .route("/messages", post(handle_relay_message))
        .route("/history", get(handle_history))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        )
}

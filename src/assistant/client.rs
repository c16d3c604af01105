use super::AssistantApi;
use super::scrub::api_error;
use super::types::{MessageList, Run, Thread, ThreadMessage};
use crate::config::Config;
use crate::error::{ConfigError, Result, UpstreamError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

/// Per-request timeout. Each poll iteration is its own short call, so this
/// sits well below the relay's overall polling ceiling.
const HTTP_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the assistant service. Holds the only copy of the
/// credential in the process; nothing downstream of this type ever sees it.
pub struct AssistantClient {
    base_url: String,
    /// Pre-computed `"Bearer <key>"` header value (avoids `format!` per request).
    cached_auth_header: Option<String>,
    assistant_id: Option<String>,
    client: Client,
}

fn build_http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}

impl AssistantClient {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cached_auth_header: config.api_key.as_deref().map(|k| format!("Bearer {k}")),
            assistant_id: config.assistant_id.clone(),
            client: build_http_client(),
        }
    }

    fn auth_header(&self) -> Result<&str> {
        self.cached_auth_header
            .as_deref()
            .ok_or_else(|| ConfigError::MissingApiKey.into())
    }

    fn assistant_id(&self) -> Result<&str> {
        self.assistant_id
            .as_deref()
            .ok_or_else(|| ConfigError::MissingAssistantId.into())
    }

    async fn post(&self, url: String, body: serde_json::Value) -> Result<reqwest::Response> {
        let auth = self.auth_header()?;
        let response = self
            .client
            .post(url)
            .header("Authorization", auth)
            .header("OpenAI-Beta", "assistants=v2")
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(api_error(response).await.into());
        }
        Ok(response)
    }

    async fn get(&self, url: String) -> Result<reqwest::Response> {
        let auth = self.auth_header()?;
        let response = self
            .client
            .get(url)
            .header("Authorization", auth)
            .header("OpenAI-Beta", "assistants=v2")
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(api_error(response).await.into());
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()).into())
    }
}

#[async_trait]
impl AssistantApi for AssistantClient {
    async fn create_thread(&self) -> Result<String> {
        // A thread with no assistant configured to run it can never produce
        // a reply; fail before allocating the remote session.
        self.auth_header()?;
        self.assistant_id()?;

        let response = self
            .post(format!("{}/v1/threads", self.base_url), json!({}))
            .await?;
        let thread: Thread = Self::decode(response).await?;
        Ok(thread.id)
    }

    async fn append_user_message(&self, thread_id: &str, text: &str) -> Result<()> {
        self.post(
            format!("{}/v1/threads/{thread_id}/messages", self.base_url),
            json!({"role": "user", "content": text}),
        )
        .await?;
        Ok(())
    }

    async fn create_run(&self, thread_id: &str) -> Result<Run> {
        let assistant_id = self.assistant_id()?.to_string();
        let response = self
            .post(
                format!("{}/v1/threads/{thread_id}/runs", self.base_url),
                json!({"assistant_id": assistant_id}),
            )
            .await?;
        Self::decode(response).await
    }

    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let response = self
            .get(format!(
                "{}/v1/threads/{thread_id}/runs/{run_id}",
                self.base_url
            ))
            .await?;
        Self::decode(response).await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>> {
        let response = self
            .get(format!("{}/v1/threads/{thread_id}/messages", self.base_url))
            .await?;
        let list: MessageList = Self::decode(response).await?;
        Ok(list.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::RunStatus;
    use crate::error::ChatError;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> Config {
        Config {
            api_key: Some("sk-test-key".to_string()),
            assistant_id: Some("asst_test".to_string()),
            base_url: base_url.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn caches_bearer_header() {
        let client = AssistantClient::new(&config("http://localhost"));
        assert_eq!(
            client.cached_auth_header.as_deref(),
            Some("Bearer sk-test-key")
        );
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = AssistantClient::new(&config("http://localhost:9999/"));
        assert_eq!(client.base_url, "http://localhost:9999");
    }

    #[tokio::test]
    async fn create_thread_fails_without_key_and_issues_no_request() {
        let mut cfg = config("http://127.0.0.1:1");
        cfg.api_key = None;
        let client = AssistantClient::new(&cfg);

        // Port 1 would error on connect; a config error proves no call was made.
        let err = client.create_thread().await.unwrap_err();
        assert!(matches!(err, ChatError::Config(ConfigError::MissingApiKey)));
    }

    #[tokio::test]
    async fn create_thread_fails_without_assistant_id() {
        let mut cfg = config("http://127.0.0.1:1");
        cfg.assistant_id = None;
        let client = AssistantClient::new(&cfg);

        let err = client.create_thread().await.unwrap_err();
        assert!(matches!(
            err,
            ChatError::Config(ConfigError::MissingAssistantId)
        ));
    }

    #[tokio::test]
    async fn create_thread_sends_credential_and_beta_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/threads"))
            .and(header("authorization", "Bearer sk-test-key"))
            .and(header("OpenAI-Beta", "assistants=v2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "thread_abc"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = AssistantClient::new(&config(&server.uri()));
        let id = client.create_thread().await.unwrap();
        assert_eq!(id, "thread_abc");
        server.verify().await;
    }

    #[tokio::test]
    async fn create_run_posts_assistant_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/threads/thread_abc/runs"))
            .and(wiremock::matchers::body_json(
                serde_json::json!({"assistant_id": "asst_test"}),
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "run_1", "status": "queued"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = AssistantClient::new(&config(&server.uri()));
        let run = client.create_run("thread_abc").await.unwrap();
        assert_eq!(run.id, "run_1");
        assert_eq!(run.status, RunStatus::Queued);
    }

    #[tokio::test]
    async fn non_success_response_maps_to_sanitized_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/threads/t/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_string(
                "Incorrect API key provided: sk-test-key. Check your configuration.",
            ))
            .mount(&server)
            .await;

        let client = AssistantClient::new(&config(&server.uri()));
        let err = client.list_messages("t").await.unwrap_err();
        let ChatError::Upstream(UpstreamError::Api { status, detail }) = err else {
            panic!("expected upstream api error, got {err:?}");
        };
        assert_eq!(status, 401);
        assert!(!detail.contains("sk-test-key"));
        assert!(detail.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn malformed_success_body_maps_to_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/threads"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = AssistantClient::new(&config(&server.uri()));
        let err = client.create_thread().await.unwrap_err();
        assert!(matches!(
            err,
            ChatError::Upstream(UpstreamError::Decode(_))
        ));
    }
}

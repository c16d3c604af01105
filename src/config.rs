use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ── Top-level config ──────────────────────────────────────────────

/// Process configuration. Built once at startup, read-only thereafter, and
/// injected into the gateway; handlers never look config up from ambient
/// process state.
///
/// Missing credential fields are not an error at load time: the gateway
/// still starts and answers per-request 500s, matching the serverless
/// behavior this service replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,
    pub assistant_id: Option<String>,
    /// Assistant service base URL. Overridable so tests can point the
    /// client at a local mock server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub poll: PollConfig,
}

fn default_base_url() -> String {
    "https://api.openai.com".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            assistant_id: None,
            base_url: default_base_url(),
            gateway: GatewayConfig::default(),
            poll: PollConfig::default(),
        }
    }
}

// ── Gateway bind ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8787
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ── Relay polling ─────────────────────────────────────────────────

/// Run-status polling knobs: fixed interval, hard attempt cap
/// (defaults give a ~30 s wall-clock ceiling).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_poll_max_attempts")]
    pub max_attempts: u32,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_poll_max_attempts() -> u32 {
    60
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            max_attempts: default_poll_max_attempts(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────

impl Config {
    /// Load from `foliochat.toml` (path overridable via `FOLIOCHAT_CONFIG`),
    /// then apply environment overrides. A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("FOLIOCHAT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("foliochat.toml"));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = fs::read_to_string(path)
                .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
            toml::from_str(&raw)
                .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    // Priority: environment variable > config file.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = non_empty(lookup("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(id) = non_empty(lookup("ASSISTANT_ID")) {
            self.assistant_id = Some(id);
        }
        if let Some(url) = non_empty(lookup("FOLIOCHAT_BASE_URL")) {
            self.base_url = url;
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

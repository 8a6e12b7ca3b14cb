//! Configuration management
//!
//! Settings come from `<config_dir>/cinequery/config.yml` when present and
//! fall back to defaults. Every default can be overridden from the
//! environment so that credentials never live in the source tree.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Completion service configuration
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Movie store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// HTTP boundary configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Completion service configuration (OpenAI-compatible chat endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the completion service; `/v1/chat/completions` is appended
    #[serde(default = "default_llm_url")]
    pub url: String,

    /// Model name for chat completions
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// API key (optional, for authenticated services)
    #[serde(default = "default_api_key", skip_serializing)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Sampling temperature; kept low so replies stay parseable
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output length cap in tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: default_llm_url(),
            model: default_chat_model(),
            api_key: default_api_key(),
            timeout_secs: default_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl LLMServiceConfig {
    /// Full URL of the chat completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.url.trim_end_matches('/'))
    }
}

fn default_llm_url() -> String {
    std::env::var("CINEQUERY_LLM_URL").unwrap_or_else(|_| "https://api.groq.com/openai".to_string())
}

fn default_chat_model() -> String {
    std::env::var("CINEQUERY_LLM_MODEL").unwrap_or_else(|_| "llama3-70b-8192".to_string())
}

fn default_api_key() -> Option<String> {
    std::env::var("CINEQUERY_LLM_API_KEY")
        .or_else(|_| std::env::var("GROQ_API_KEY"))
        .ok()
        .filter(|key| !key.trim().is_empty())
}

fn default_timeout() -> u64 {
    std::env::var("CINEQUERY_LLM_TIMEOUT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10)
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    1000
}

/// Movie store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the SQLite database holding the catalog
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    std::env::var("CINEQUERY_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| crate::Database::default_path())
}

/// HTTP boundary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `127.0.0.1:3000`
    #[serde(default = "default_addr")]
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

fn default_addr() -> String {
    std::env::var("CINEQUERY_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string())
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load config from an explicit path, falling back to defaults when the
    /// file does not exist
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}

//! HTTP client for OpenAI-compatible chat completion services (Groq, OpenAI,
//! vLLM, etc.)

use crate::config::LLMServiceConfig;
use crate::error::{Result, TranslationError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trait for completion service clients
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one chat completion and return the first choice's text, if any.
    ///
    /// A single attempt; non-success statuses are errors.
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        options: &CompletionOptions,
    ) -> std::result::Result<Option<String>, TranslationError>;

    /// Get model name
    fn model_name(&self) -> &str;

    /// Request counters, when the client keeps them
    fn metrics(&self) -> Option<MetricsSnapshot> {
        None
    }
}

/// Chat message for completion requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling knobs sent with every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 1000,
        }
    }
}

impl From<&LLMServiceConfig> for CompletionOptions {
    fn from(config: &LLMServiceConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// API metrics for monitoring
#[derive(Debug, Default)]
pub struct APIMetrics {
    pub total_requests: AtomicU64,
    pub total_errors: AtomicU64,
    pub total_latency_ms: AtomicU64,
}

/// Snapshot of API metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub avg_latency_ms: f64,
}

/// OpenAI-compatible chat completions client
pub struct HttpCompletionClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
    metrics: Arc<APIMetrics>,
}

impl HttpCompletionClient {
    /// Create new client from configuration
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        if config.api_key.is_none() {
            tracing::warn!(
                "No API key configured for {}; set CINEQUERY_LLM_API_KEY",
                config.url
            );
        }

        Ok(Self {
            http_client,
            config,
            metrics: Arc::new(APIMetrics::default()),
        })
    }

    fn record_error(&self) {
        self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        options: &CompletionOptions,
    ) -> std::result::Result<Option<String>, TranslationError> {
        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let url = self.config.completions_url();
        tracing::debug!("POST {} (model {})", url, self.config.model);

        let mut req = self.http_client.post(&url).json(&request);

        if let Some(ref api_key) = self.config.api_key {
            req = req.bearer_auth(api_key);
        }

        let response = req.send().await.map_err(|e| {
            self.record_error();
            TranslationError::from(e)
        })?;

        if !response.status().is_success() {
            self.record_error();
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Completion service error (HTTP {}): {}", status, body);
            return Err(TranslationError::Upstream { status, body });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            self.record_error();
            TranslationError::from(e)
        })?;

        let elapsed = start.elapsed().as_millis() as u64;
        self.metrics
            .total_latency_ms
            .fetch_add(elapsed, Ordering::Relaxed);
        tracing::debug!("Completion received in {}ms", elapsed);

        Ok(chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn metrics(&self) -> Option<MetricsSnapshot> {
        let total = self.metrics.total_requests.load(Ordering::Relaxed);
        Some(MetricsSnapshot {
            total_requests: total,
            total_errors: self.metrics.total_errors.load(Ordering::Relaxed),
            avg_latency_ms: if total > 0 {
                self.metrics.total_latency_ms.load(Ordering::Relaxed) as f64 / total as f64
            } else {
                0.0
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "llama3-70b-8192",
            messages: vec![ChatMessage::system("rules"), ChatMessage::user("horror films")],
            temperature: 0.1,
            max_tokens: 1000,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "horror films");
        assert_eq!(value["max_tokens"], 1000);
    }

    #[test]
    fn test_response_without_content() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"role": "assistant"}}]}"#).unwrap();
        assert!(response.choices[0].message.content.is_none());

        let response: ChatResponse = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(response.choices.is_empty());
    }

    #[test]
    fn test_options_follow_config() {
        let mut config = LLMServiceConfig::default();
        config.temperature = 0.0;
        config.max_tokens = 64;
        assert_eq!(
            CompletionOptions::from(&config),
            CompletionOptions {
                temperature: 0.0,
                max_tokens: 64
            }
        );
    }
}

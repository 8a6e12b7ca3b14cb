//! LLM integration
//!
//! Provides:
//! - An OpenAI-compatible chat completions client
//! - The query translator built on top of it

mod client;
mod translator;

pub use client::{
    APIMetrics, ChatMessage, CompletionClient, CompletionOptions, HttpCompletionClient,
    MetricsSnapshot,
};
pub use translator::{parse_completion, QueryTranslator, SYSTEM_PROMPT};

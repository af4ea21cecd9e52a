//! LLM abstraction and the hosted (OpenAI-compatible) provider client.
//!
//! The conversation layer only depends on [`LlmBackend`]; tests substitute a scripted backend.

mod groq;

pub use groq::{GroqClient, ProviderModel};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors from a completion call, surfaced to the session boundary.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("llm request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("llm api error: {0}")]
    Api(String),
    #[error("llm call timed out after {0}s")]
    Timeout(u64),
    #[error("llm api key not configured (set GROQ_API_KEY or llm.apiKey)")]
    MissingApiKey,
}

/// One chat message in provider wire order (role + content).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
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

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Result of a non-streaming completion.
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    pub message: Option<ChatMessage>,
}

impl ChatResponse {
    /// Text content of the assistant message, if any.
    pub fn content(&self) -> &str {
        self.message
            .as_ref()
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

/// A chat-completion provider.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn chat(&self, model: &str, messages: Vec<ChatMessage>) -> Result<ChatResponse, LlmError>;
}

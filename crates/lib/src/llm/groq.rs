//! Groq client over the OpenAI-compatible API (`/chat/completions`, `/models`).

use super::{ChatMessage, ChatResponse, LlmBackend, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Client for an OpenAI-compatible chat endpoint with bearer auth.
#[derive(Clone)]
pub struct GroqClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl GroqClient {
    pub fn new(base_url: Option<String>, api_key: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.api_key.as_deref().ok_or(LlmError::MissingApiKey)
    }

    /// GET /models — list models available to this key.
    pub async fn list_models(&self) -> Result<Vec<ProviderModel>, LlmError> {
        let url = format!("{}/models", self.base_url);
        let res = self
            .client
            .get(&url)
            .bearer_auth(self.api_key()?)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("{} {}", status, body)));
        }
        let data: ModelsResponse = res.json().await?;
        Ok(data
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|m| ProviderModel { name: m.id })
            .collect())
    }

    /// POST /chat/completions — non-streaming chat.
    async fn chat_completion(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = CompletionRequest {
            model: model.to_string(),
            messages,
            stream: false,
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(self.api_key()?)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("{} {}", status, body)));
        }
        let data: CompletionResponse = res.json().await?;
        Ok(completion_to_chat_response(data))
    }
}

#[async_trait]
impl LlmBackend for GroqClient {
    async fn chat(&self, model: &str, messages: Vec<ChatMessage>) -> Result<ChatResponse, LlmError> {
        self.chat_completion(model, messages).await
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderModel {
    pub name: String,
}

// --- OpenAI wire types ---

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Option<Vec<CompletionChoice>>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Option<Vec<ModelObject>>,
}

#[derive(Debug, Deserialize)]
struct ModelObject {
    id: String,
}

fn completion_to_chat_response(data: CompletionResponse) -> ChatResponse {
    let content = data
        .choices
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default();
    ChatResponse {
        message: Some(ChatMessage::assistant(content)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_choice_content_is_used() {
        let data: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"Namaste"}},{"message":{"content":"ignored"}}]}"#,
        )
        .unwrap();
        assert_eq!(completion_to_chat_response(data).content(), "Namaste");
    }

    #[test]
    fn missing_choices_yield_empty_content() {
        let data: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(completion_to_chat_response(data).content(), "");
        let data: CompletionResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(completion_to_chat_response(data).content(), "");
    }

    #[test]
    fn request_serializes_in_openai_shape() {
        let body = CompletionRequest {
            model: "m".to_string(),
            messages: vec![ChatMessage::system("s"), ChatMessage::user("u")],
            stream: false,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][1]["content"], "u");
        assert_eq!(v["stream"], false);
    }

    #[tokio::test]
    async fn chat_without_key_fails_before_network() {
        let client = GroqClient::new(Some("http://127.0.0.1:9/v1/".to_string()), None);
        let err = client.chat("m", vec![ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }
}

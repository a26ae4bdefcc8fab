//! OpenAI Chat Completions client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{ChatMessage, LlmClient, LlmError, ModelTurn, Role};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Cap on upstream error bodies carried into error values; full bodies stay
/// out of client-facing messages.
const ERROR_BODY_MAX_LEN: usize = 200;

pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Override the API base URL (for OpenAI-compatible endpoints).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn post_completion(&self, body: &Value) -> Result<OpenAiResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = truncate(&response.text().await.unwrap_or_default(), ERROR_BODY_MAX_LEN);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[Value]>,
    ) -> Result<ModelTurn, LlmError> {
        tracing::debug!(model, message_count = messages.len(), "chat completion");

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "temperature": 0,
        });
        if let Some(tools) = tools {
            if !tools.is_empty() {
                body["tools"] = serde_json::json!(tools);
                body["tool_choice"] = serde_json::json!("auto");
            }
        }

        let api_response = self.post_completion(&body).await?;
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("response contained no choices".to_string()))?;

        Ok(ModelTurn {
            content: choice.message.content,
            tool_calls: choice.message.tool_calls,
        })
    }

    async fn completion_text(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        tracing::debug!(model, "text completion");

        let messages = [ChatMessage {
            role: Role::User,
            content: Some(prompt.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }];
        let body = serde_json::json!({
            "model": model,
            "messages": messages,
        });

        let api_response = self.post_completion(&body).await?;
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("response contained no choices".to_string()))?;

        choice
            .message
            .content
            .ok_or_else(|| LlmError::InvalidResponse("response contained no text".to_string()))
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated]", &s[..end])
    }
}

// Wire format of the response, reduced to the fields we read.

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    tool_calls: Option<Vec<super::ToolCall>>,
}

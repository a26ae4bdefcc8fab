//! Language model client abstraction.
//!
//! The agent talks to the model through the [`LlmClient`] trait so the loop
//! can be driven by a scripted client in tests. The production client lives
//! in [`openai`].

mod openai;

pub use openai::OpenAiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Message roles in the chat completion wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One message in the chat completion wire format.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// A tool call as the model emits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "tool_call_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

fn tool_call_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, exactly as the model emitted it.
    pub arguments: String,
}

/// One completed model turn: answer text, tool calls, or both absent on a
/// malformed reply (callers treat that as an invalid response).
#[derive(Debug, Clone, Default)]
pub struct ModelTurn {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

/// Client interface for the language model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one tool-bound chat turn over the full conversation.
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[Value]>,
    ) -> Result<ModelTurn, LlmError>;

    /// Run a one-shot prompt completion and return the raw response text.
    async fn completion_text(&self, model: &str, prompt: &str) -> Result<String, LlmError>;
}

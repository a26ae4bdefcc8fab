//! API request and response types.

use serde::{Deserialize, Serialize};

/// Request to fact-check a health-product claim.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The user's question
    pub message: String,
}

/// Aggregated fact-check response.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    /// Final answer text (returned as-is when the cycle cap expires)
    pub response: String,

    /// Research tools consulted while producing the answer
    pub sources: Vec<String>,
}

/// One frame of the streaming response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Content produced by a loop step.
    Message { content: String, node: String },
    /// Terminal frame; nothing follows.
    Done,
    /// Terminal failure frame; nothing follows.
    Error { message: String },
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
}

/// Root endpoint greeting.
#[derive(Debug, Clone, Serialize)]
pub struct RootResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stream_events_serialize_with_a_type_tag() {
        let message = StreamEvent::Message {
            content: "partial".to_string(),
            node: "agent".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"type": "message", "content": "partial", "node": "agent"})
        );

        assert_eq!(
            serde_json::to_value(&StreamEvent::Done).unwrap(),
            json!({"type": "done"})
        );

        let error = StreamEvent::Error {
            message: "upstream failed".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({"type": "error", "message": "upstream failed"})
        );
    }

    #[test]
    fn chat_request_parses_the_message_field() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"message": "Is collagen worth it?"}"#).unwrap();
        assert_eq!(request.message, "Is collagen worth it?");
    }
}

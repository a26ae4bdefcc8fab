//! Conversation data model for a single fact-check request.
//!
//! A conversation is owned by exactly one loop invocation, is append-only,
//! and is discarded when the request completes. The first two messages are
//! always the directive and the user query; the constructor enforces this
//! and nothing here removes or rewrites messages.

use std::collections::BTreeSet;

use crate::llm::{ChatMessage, FunctionCall, Role, ToolCall};
use crate::tools::{ToolInvocation, ToolKind, ToolResult};

/// One entry in the conversation history.
#[derive(Debug, Clone)]
pub enum Message {
    /// Role-establishing instruction, first in every conversation.
    Directive(String),
    /// The user's raw question, second in every conversation.
    Query(String),
    /// Output of a generation step.
    Generated(Generated),
    /// Output of one tool invocation.
    ToolResult(ToolResult),
}

/// What a generation step produced. Exactly one shape exists per turn:
/// an answer carries non-empty text and no invocations, a tool request
/// carries invocations and no text.
#[derive(Debug, Clone)]
pub enum Generated {
    Answer(String),
    ToolRequests(Vec<ToolInvocation>),
}

impl Generated {
    pub fn is_action(&self) -> bool {
        matches!(self, Generated::ToolRequests(_))
    }

    pub fn answer_text(&self) -> Option<&str> {
        match self {
            Generated::Answer(text) => Some(text),
            Generated::ToolRequests(_) => None,
        }
    }
}

/// Ordered message history for one request.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(directive: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            messages: vec![
                Message::Directive(directive.into()),
                Message::Query(query.into()),
            ],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The user's original question.
    pub fn query(&self) -> &str {
        self.messages
            .iter()
            .find_map(|m| match m {
                Message::Query(q) => Some(q.as_str()),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn push_generated(&mut self, generated: Generated) {
        self.messages.push(Message::Generated(generated));
    }

    pub fn push_tool_results(&mut self, results: Vec<ToolResult>) {
        for result in results {
            self.messages.push(Message::ToolResult(result));
        }
    }

    /// Most recent generation, if any.
    pub fn latest_generated(&self) -> Option<&Generated> {
        self.messages.iter().rev().find_map(|m| match m {
            Message::Generated(g) => Some(g),
            _ => None,
        })
    }

    /// Messages counted against the cycle cap: everything after the fixed
    /// directive/query prefix, tool results included.
    pub fn cycle_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| matches!(m, Message::Generated(_) | Message::ToolResult(_)))
            .count()
    }

    /// Number of generation steps taken so far.
    pub fn generation_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| matches!(m, Message::Generated(_)))
            .count()
    }

    /// Most recent candidate answer text, if any generation produced one.
    pub fn final_answer(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            Message::Generated(Generated::Answer(text)) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Known research tools requested during this conversation, de-duplicated
    /// and ordered by name. Unknown names never count as sources.
    pub fn sources(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for message in &self.messages {
            if let Message::Generated(Generated::ToolRequests(invocations)) = message {
                for invocation in invocations {
                    if ToolKind::from_name(&invocation.name).is_some() {
                        names.insert(invocation.name.clone());
                    }
                }
            }
        }
        names.into_iter().collect()
    }

    /// Project the conversation into the model wire format.
    pub fn chat_messages(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .map(|message| match message {
                Message::Directive(text) => ChatMessage {
                    role: Role::System,
                    content: Some(text.clone()),
                    tool_calls: None,
                    tool_call_id: None,
                },
                Message::Query(text) => ChatMessage {
                    role: Role::User,
                    content: Some(text.clone()),
                    tool_calls: None,
                    tool_call_id: None,
                },
                Message::Generated(Generated::Answer(text)) => ChatMessage {
                    role: Role::Assistant,
                    content: Some(text.clone()),
                    tool_calls: None,
                    tool_call_id: None,
                },
                Message::Generated(Generated::ToolRequests(invocations)) => ChatMessage {
                    role: Role::Assistant,
                    content: None,
                    tool_calls: Some(
                        invocations
                            .iter()
                            .map(|invocation| ToolCall {
                                id: invocation.id.clone(),
                                call_type: "function".to_string(),
                                function: FunctionCall {
                                    name: invocation.name.clone(),
                                    arguments: invocation.arguments.to_string(),
                                },
                            })
                            .collect(),
                    ),
                    tool_call_id: None,
                },
                Message::ToolResult(result) => ChatMessage {
                    role: Role::Tool,
                    content: Some(result.content.clone()),
                    tool_calls: None,
                    tool_call_id: Some(result.id.clone()),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invocation(id: &str, name: &str) -> ToolInvocation {
        ToolInvocation {
            id: id.to_string(),
            name: name.to_string(),
            arguments: json!({"query": "q"}),
        }
    }

    fn result(id: &str, name: &str) -> ToolResult {
        ToolResult {
            id: id.to_string(),
            name: name.to_string(),
            content: "some results".to_string(),
            is_error: false,
        }
    }

    #[test]
    fn prefix_is_directive_then_query_and_survives_appends() {
        let mut conversation = Conversation::new("be rigorous", "is zinc effective?");
        conversation.push_generated(Generated::ToolRequests(vec![invocation("1", "web_search")]));
        conversation.push_tool_results(vec![result("1", "web_search")]);
        conversation.push_generated(Generated::Answer("mixed evidence".to_string()));

        assert!(matches!(&conversation.messages()[0], Message::Directive(d) if d == "be rigorous"));
        assert!(matches!(&conversation.messages()[1], Message::Query(q) if q == "is zinc effective?"));
        assert_eq!(conversation.query(), "is zinc effective?");
    }

    #[test]
    fn cycle_count_includes_tool_results_but_not_the_prefix() {
        let mut conversation = Conversation::new("d", "q");
        assert_eq!(conversation.cycle_count(), 0);

        conversation.push_generated(Generated::ToolRequests(vec![
            invocation("1", "web_search"),
            invocation("2", "arxiv_search"),
        ]));
        conversation.push_tool_results(vec![result("1", "web_search"), result("2", "arxiv_search")]);
        conversation.push_generated(Generated::Answer("a".to_string()));

        assert_eq!(conversation.cycle_count(), 4);
        assert_eq!(conversation.generation_count(), 2);
    }

    #[test]
    fn final_answer_is_the_latest_candidate() {
        let mut conversation = Conversation::new("d", "q");
        conversation.push_generated(Generated::Answer("first draft".to_string()));
        conversation.push_generated(Generated::Answer("second draft".to_string()));

        assert_eq!(conversation.final_answer(), Some("second draft"));
    }

    #[test]
    fn sources_deduplicate_and_drop_unknown_names() {
        let mut conversation = Conversation::new("d", "q");
        conversation.push_generated(Generated::ToolRequests(vec![
            invocation("1", "web_search"),
            invocation("2", "made_up_tool"),
        ]));
        conversation.push_generated(Generated::ToolRequests(vec![invocation("3", "web_search")]));

        assert_eq!(conversation.sources(), vec!["web_search".to_string()]);
    }

    #[test]
    fn chat_messages_correlate_tool_results_by_id() {
        let mut conversation = Conversation::new("d", "q");
        conversation.push_generated(Generated::ToolRequests(vec![invocation("call_9", "web_search")]));
        conversation.push_tool_results(vec![result("call_9", "web_search")]);

        let wire = conversation.chat_messages();
        assert_eq!(wire.len(), 4);
        assert_eq!(wire[0].role, Role::System);
        assert_eq!(wire[1].role, Role::User);
        assert_eq!(wire[2].role, Role::Assistant);
        assert!(wire[2].content.is_none());
        assert_eq!(
            wire[2].tool_calls.as_ref().map(|c| c[0].id.as_str()),
            Some("call_9")
        );
        assert_eq!(wire[3].role, Role::Tool);
        assert_eq!(wire[3].tool_call_id.as_deref(), Some("call_9"));
    }
}

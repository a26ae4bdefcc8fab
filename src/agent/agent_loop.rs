//! Core fact-checking loop implementation.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::llm::{LlmClient, LlmError, OpenAiClient};
use crate::tools::{ToolInvocation, ToolRegistry};

use super::conversation::{Conversation, Generated};
use super::grounding::GroundednessEvaluator;
use super::prompt::DIRECTIVE;
use super::routing::{needs_evaluation, next_state, route, LoopState, RoutingDecision, Termination};

/// Upper bound on tool invocations accepted from a single generation; excess
/// requests are dropped to bound the cost of one step.
const MAX_TOOL_CALLS_PER_STEP: usize = 10;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model invocation failed: {0}")]
    Model(#[from] LlmError),

    #[error("model returned an empty turn")]
    EmptyTurn,
}

/// Final outcome of one fact-check request.
#[derive(Debug, Clone)]
pub struct FactCheckReport {
    /// The answer text. Empty only when the cycle cap expired before the
    /// model ever produced a candidate.
    pub answer: String,
    /// Research tools consulted, de-duplicated.
    pub sources: Vec<String>,
    /// Generation steps taken.
    pub cycles: usize,
    pub termination: Termination,
}

/// Incremental output surfaced in streaming mode.
#[derive(Debug, Clone)]
pub enum LoopEvent {
    /// A candidate answer was generated.
    Candidate { content: String },
    /// A tool invocation completed.
    ToolOutput { name: String, content: String },
}

/// The fact-checking agent: drives the loop state machine to completion.
pub struct FactChecker {
    llm: Arc<dyn LlmClient>,
    evaluator: GroundednessEvaluator,
    tools: ToolRegistry,
    model: String,
    max_cycles: usize,
}

impl FactChecker {
    /// Create an agent with production collaborators from configuration.
    pub fn new(config: &Config) -> Self {
        let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(config.openai_api_key.clone()));
        let evaluator = GroundednessEvaluator::new(Arc::clone(&llm), config.evaluator_model.clone());
        let tools = ToolRegistry::new(config);

        Self {
            llm,
            evaluator,
            tools,
            model: config.model.clone(),
            max_cycles: config.max_cycles,
        }
    }

    /// Create an agent from explicit collaborators (useful for testing).
    pub fn with_parts(
        llm: Arc<dyn LlmClient>,
        evaluator: GroundednessEvaluator,
        tools: ToolRegistry,
        model: impl Into<String>,
        max_cycles: usize,
    ) -> Self {
        Self {
            llm,
            evaluator,
            tools,
            model: model.into(),
            max_cycles,
        }
    }

    /// Run a fact-check to completion and return the aggregated report.
    pub async fn run(&self, query: &str) -> Result<FactCheckReport, AgentError> {
        let mut conversation = Conversation::new(DIRECTIVE, query);
        let termination = self.drive(&mut conversation, None).await?;
        Ok(Self::report(&conversation, termination))
    }

    /// Run a fact-check, surfacing each content-bearing message on `events`
    /// as it is produced. Same state machine and caps as [`run`].
    pub async fn run_streaming(
        &self,
        query: &str,
        events: mpsc::Sender<LoopEvent>,
    ) -> Result<FactCheckReport, AgentError> {
        let mut conversation = Conversation::new(DIRECTIVE, query);
        let termination = self.drive(&mut conversation, Some(&events)).await?;
        Ok(Self::report(&conversation, termination))
    }

    fn report(conversation: &Conversation, termination: Termination) -> FactCheckReport {
        FactCheckReport {
            answer: conversation.final_answer().unwrap_or_default().to_string(),
            sources: conversation.sources(),
            cycles: conversation.generation_count(),
            termination,
        }
    }

    /// Drive the state machine to `Done`.
    ///
    /// Every pass through `Generating` appends exactly one Generated
    /// message, so the generation budget bounds the loop even when the model
    /// requests tools on every turn and routing never reaches the cap check.
    async fn drive(
        &self,
        conversation: &mut Conversation,
        events: Option<&mpsc::Sender<LoopEvent>>,
    ) -> Result<Termination, AgentError> {
        let schemas = self.tools.schemas();
        let mut state = LoopState::Generating;
        let mut termination = None;

        while state != LoopState::Done {
            match state {
                LoopState::Generating => {
                    if conversation.generation_count() >= self.max_cycles {
                        break;
                    }

                    let generated = self.generate(conversation, &schemas).await?;
                    tracing::debug!(
                        cycle = conversation.generation_count() + 1,
                        action = generated.is_action(),
                        "generation step"
                    );

                    if let (Some(text), Some(tx)) = (generated.answer_text(), events) {
                        let _ = tx
                            .send(LoopEvent::Candidate {
                                content: text.to_string(),
                            })
                            .await;
                    }

                    let is_action = generated.is_action();
                    conversation.push_generated(generated);
                    state = if is_action {
                        LoopState::ToolExec
                    } else {
                        LoopState::Evaluating
                    };
                }

                LoopState::Evaluating => {
                    // The verdict is only fetched when routing will consult
                    // it; a capped conversation terminates unevaluated.
                    let grounded = if needs_evaluation(conversation, self.max_cycles) {
                        let answer = conversation.final_answer().unwrap_or_default();
                        self.evaluator.is_grounded(conversation.query(), answer).await?
                    } else {
                        false
                    };

                    let decision = route(conversation, self.max_cycles, grounded);
                    tracing::debug!(?decision, "routing decision");
                    if let RoutingDecision::Terminate(t) = decision {
                        termination = Some(t);
                    }
                    state = next_state(state, decision);
                }

                LoopState::ToolExec => {
                    let invocations: Vec<ToolInvocation> = match conversation.latest_generated() {
                        Some(Generated::ToolRequests(invocations)) => invocations.clone(),
                        _ => Vec::new(),
                    };

                    let results = self.tools.execute_batch(&invocations).await;
                    if let Some(tx) = events {
                        for result in &results {
                            let _ = tx
                                .send(LoopEvent::ToolOutput {
                                    name: result.name.clone(),
                                    content: result.content.clone(),
                                })
                                .await;
                        }
                    }
                    conversation.push_tool_results(results);

                    // Unconditional once every result is collected.
                    state = LoopState::Generating;
                }

                LoopState::Done => {}
            }
        }

        Ok(termination.unwrap_or(Termination::CycleCapExceeded))
    }

    /// One generation step: call the model over the conversation so far and
    /// classify the turn as answer-bearing or action-bearing.
    async fn generate(
        &self,
        conversation: &Conversation,
        schemas: &[Value],
    ) -> Result<Generated, AgentError> {
        let messages = conversation.chat_messages();
        let turn = self
            .llm
            .chat_completion(&self.model, &messages, Some(schemas))
            .await?;

        if let Some(tool_calls) = turn.tool_calls {
            if !tool_calls.is_empty() {
                let mut invocations: Vec<ToolInvocation> = tool_calls
                    .into_iter()
                    .map(|call| {
                        let arguments = serde_json::from_str(&call.function.arguments)
                            .unwrap_or(Value::Null);
                        ToolInvocation {
                            id: call.id,
                            name: call.function.name,
                            arguments,
                        }
                    })
                    .collect();

                if invocations.len() > MAX_TOOL_CALLS_PER_STEP {
                    tracing::warn!(
                        requested = invocations.len(),
                        limit = MAX_TOOL_CALLS_PER_STEP,
                        "dropping excess tool invocations"
                    );
                    invocations.truncate(MAX_TOOL_CALLS_PER_STEP);
                }

                return Ok(Generated::ToolRequests(invocations));
            }
        }

        match turn.content {
            Some(content) if !content.is_empty() => Ok(Generated::Answer(content)),
            _ => Err(AgentError::EmptyTurn),
        }
    }
}

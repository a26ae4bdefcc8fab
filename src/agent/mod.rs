//! Agent module - the fact-checking loop.
//!
//! The loop follows a generate→route→act pattern:
//! 1. Build the conversation with the directive and the user's question
//! 2. Generate a turn; tool requests are executed and the results fed back
//! 3. Candidate answers are judged for groundedness; a grounded answer (or
//!    an exhausted cycle budget) ends the loop, an ungrounded one retries
//!    with the rejected attempt still in view

mod agent_loop;
mod conversation;
mod grounding;
mod prompt;
mod routing;

pub use agent_loop::{AgentError, FactCheckReport, FactChecker, LoopEvent};
pub use conversation::{Conversation, Generated, Message};
pub use grounding::GroundednessEvaluator;
pub use prompt::DIRECTIVE;
pub use routing::{LoopState, RoutingDecision, Termination};

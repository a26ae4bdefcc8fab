//! Routing policy and loop state machine.
//!
//! The loop is modeled as an explicit finite state machine driven by
//! iteration, never by recursion. [`route`] is the complete decision policy
//! applied after each generation step; [`next_state`] is the pure transition
//! function over it.

use super::conversation::Conversation;

/// States of the fact-check loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Generating,
    Evaluating,
    ToolExec,
    Done,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The evaluator accepted the latest candidate answer.
    Grounded,
    /// The cycle cap forced termination; the latest candidate is returned
    /// as-is. This is a defined outcome, not a failure.
    CycleCapExceeded,
}

/// Decision taken once per generation step. Derived transiently, never
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Loop back into generation; the rejected attempt stays in history.
    Retry,
    /// Dispatch the requested tools, then generate again.
    InvokeTools,
    Terminate(Termination),
}

/// The routing policy, in priority order:
///
/// 1. the latest generation requests tools: invoke them — a turn that asks
///    for tools is never judged for groundedness;
/// 2. the conversation has used up its cycle budget: terminate with whatever
///    candidate exists;
/// 3. otherwise the evaluator's verdict on the latest candidate decides
///    between terminating and retrying.
///
/// `grounded` is only consulted when the first two priorities pass; callers
/// use [`needs_evaluation`] to know whether a verdict must be obtained at
/// all.
pub fn route(conversation: &Conversation, cap: usize, grounded: bool) -> RoutingDecision {
    match conversation.latest_generated() {
        Some(g) if g.is_action() => RoutingDecision::InvokeTools,
        _ if conversation.cycle_count() >= cap => {
            RoutingDecision::Terminate(Termination::CycleCapExceeded)
        }
        _ if grounded => RoutingDecision::Terminate(Termination::Grounded),
        _ => RoutingDecision::Retry,
    }
}

/// Whether routing will need the evaluator's verdict: true exactly when the
/// latest generation is answer-bearing and the cycle cap has not been hit.
pub fn needs_evaluation(conversation: &Conversation, cap: usize) -> bool {
    match conversation.latest_generated() {
        Some(g) if g.is_action() => false,
        _ => conversation.cycle_count() < cap,
    }
}

/// Pure transition function of the state machine.
pub fn next_state(state: LoopState, decision: RoutingDecision) -> LoopState {
    match (state, decision) {
        (LoopState::Done, _) => LoopState::Done,
        (_, RoutingDecision::InvokeTools) => LoopState::ToolExec,
        (_, RoutingDecision::Terminate(_)) => LoopState::Done,
        (_, RoutingDecision::Retry) => LoopState::Generating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::conversation::Generated;
    use crate::tools::{ToolInvocation, ToolResult};
    use serde_json::json;

    const CAP: usize = 10;

    fn conversation() -> Conversation {
        Conversation::new("directive", "query")
    }

    fn tool_request() -> Generated {
        Generated::ToolRequests(vec![ToolInvocation {
            id: "1".to_string(),
            name: "web_search".to_string(),
            arguments: json!({"query": "q"}),
        }])
    }

    fn tool_result() -> ToolResult {
        ToolResult {
            id: "1".to_string(),
            name: "web_search".to_string(),
            content: "results".to_string(),
            is_error: false,
        }
    }

    #[test]
    fn tool_requests_bypass_evaluation_and_the_cap() {
        let mut conv = conversation();
        conv.push_generated(tool_request());

        // Even a grounded verdict is ignored when tools are requested.
        assert_eq!(route(&conv, CAP, true), RoutingDecision::InvokeTools);
        assert!(!needs_evaluation(&conv, CAP));
    }

    #[test]
    fn grounded_answer_terminates_under_cap() {
        let mut conv = conversation();
        conv.push_generated(Generated::Answer("a".to_string()));

        assert!(needs_evaluation(&conv, CAP));
        assert_eq!(
            route(&conv, CAP, true),
            RoutingDecision::Terminate(Termination::Grounded)
        );
        assert_eq!(route(&conv, CAP, false), RoutingDecision::Retry);
    }

    #[test]
    fn cap_terminates_regardless_of_verdict() {
        let mut conv = conversation();
        for _ in 0..CAP {
            conv.push_generated(Generated::Answer("a".to_string()));
        }

        assert!(!needs_evaluation(&conv, CAP));
        assert_eq!(
            route(&conv, CAP, true),
            RoutingDecision::Terminate(Termination::CycleCapExceeded)
        );
        assert_eq!(
            route(&conv, CAP, false),
            RoutingDecision::Terminate(Termination::CycleCapExceeded)
        );
    }

    #[test]
    fn tool_results_count_toward_the_cap() {
        let mut conv = conversation();
        // 4 tool detours of (request + two results) = 12 counted messages.
        for _ in 0..4 {
            conv.push_generated(tool_request());
            conv.push_tool_results(vec![tool_result(), tool_result()]);
        }
        conv.push_generated(Generated::Answer("a".to_string()));

        assert_eq!(
            route(&conv, CAP, false),
            RoutingDecision::Terminate(Termination::CycleCapExceeded)
        );
    }

    #[test]
    fn transitions_match_the_state_machine() {
        assert_eq!(
            next_state(LoopState::Generating, RoutingDecision::InvokeTools),
            LoopState::ToolExec
        );
        assert_eq!(
            next_state(LoopState::Evaluating, RoutingDecision::Retry),
            LoopState::Generating
        );
        assert_eq!(
            next_state(
                LoopState::Evaluating,
                RoutingDecision::Terminate(Termination::Grounded)
            ),
            LoopState::Done
        );
        assert_eq!(
            next_state(
                LoopState::Evaluating,
                RoutingDecision::Terminate(Termination::CycleCapExceeded)
            ),
            LoopState::Done
        );
        // Done is terminal.
        assert_eq!(
            next_state(LoopState::Done, RoutingDecision::Retry),
            LoopState::Done
        );
    }
}

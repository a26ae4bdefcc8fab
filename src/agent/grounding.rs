//! Groundedness evaluation of candidate answers.

use std::sync::Arc;

use crate::llm::{LlmClient, LlmError};

use super::prompt::build_groundedness_prompt;

/// Literal marker whose presence in the evaluator's raw output means
/// "grounded".
const AFFIRMATIVE_MARKER: &str = "Y";

/// Judges whether a candidate answer is adequately evidence-grounded,
/// as opposed to restating a marketing assertion.
pub struct GroundednessEvaluator {
    llm: Arc<dyn LlmClient>,
    model: String,
}

impl GroundednessEvaluator {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Submit the fixed evaluation prompt and interpret the free-form reply.
    pub async fn is_grounded(&self, query: &str, candidate_answer: &str) -> Result<bool, LlmError> {
        let prompt = build_groundedness_prompt(query, candidate_answer);
        let raw = self.llm.completion_text(&self.model, &prompt).await?;
        let grounded = affirmative_marker_present(&raw);
        tracing::debug!(grounded, "groundedness verdict");
        Ok(grounded)
    }
}

/// Case-sensitive substring check for the affirmative marker.
///
/// The verdict hinges on the literal `Y` appearing anywhere in the raw reply,
/// so any phrasing that happens to contain an uppercase Y reads as
/// affirmative. This is the single decision point; replacing it with a
/// structured verdict leaves the rest of the loop untouched.
pub fn affirmative_marker_present(raw: &str) -> bool {
    raw.contains(AFFIRMATIVE_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_marker_is_affirmative() {
        assert!(affirmative_marker_present("Y"));
        assert!(affirmative_marker_present("Y - the response cites trials"));
    }

    #[test]
    fn marker_inside_a_word_still_counts() {
        // Documented brittleness: any uppercase Y anywhere reads as grounded.
        assert!(affirmative_marker_present("definitelY not grounded"));
        assert!(affirmative_marker_present("N, but Yelp reviews were cited"));
    }

    #[test]
    fn negative_and_lowercase_replies_are_ungrounded() {
        assert!(!affirmative_marker_present("N"));
        assert!(!affirmative_marker_present("y"));
        assert!(!affirmative_marker_present("not grounded"));
        assert!(!affirmative_marker_present(""));
    }
}

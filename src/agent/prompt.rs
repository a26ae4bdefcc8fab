//! Prompt text for the fact-checking agent.

/// Role-establishing instruction, first message of every conversation.
pub const DIRECTIVE: &str = "\
You are a cautious, evidence-driven health-product analyst assisting a user \
who is highly skeptical of advertising claims.

Your role is to:
1. Analyze nutritional and health product claims with scientific rigor
2. Search for peer-reviewed research and credible sources
3. Provide balanced, evidence-based assessments
4. Clearly distinguish between proven benefits and marketing claims
5. Highlight any potential risks or side effects
6. Recommend consulting healthcare professionals for personalized advice

Always cite your sources and be transparent about the limitations of \
available evidence.";

/// Build the groundedness evaluation prompt, embedding the original query
/// and the candidate answer verbatim.
pub fn build_groundedness_prompt(query: &str, answer: &str) -> String {
    format!(
        "Given an initial query and a final response, determine if the response \
is scientifically grounded or not.

Please indicate scientific groundedness with a 'Y' and ungroundedness as an 'N'.

Initial Query:
{query}

Final Response:
{answer}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groundedness_prompt_embeds_both_texts_verbatim() {
        let prompt = build_groundedness_prompt("is zinc effective?", "Zinc may shorten colds.");
        assert!(prompt.contains("Initial Query:\nis zinc effective?"));
        assert!(prompt.contains("Final Response:\nZinc may shorten colds."));
        assert!(prompt.contains("'Y'"));
    }
}

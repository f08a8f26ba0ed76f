//! Assistant prompt templates for tutoring interventions.

/// Prompt sent after the learner has sat idle on a knowledge point.
pub fn idle_prompt(title: &str) -> String {
    format!(
        "I noticed you've been on \"{title}\" for a while without moving forward. \
         Is something unclear? Happy to walk through it together."
    )
}

/// Prompt sent after repeated quiz failures. Offers exactly three
/// remediation options.
pub fn failure_prompt(title: &str) -> String {
    format!(
        "It looks like \"{title}\" is proving tricky, and that's completely normal. \
         We could: 1) go back over the core idea step by step, \
         2) work through a simpler example first, or \
         3) try the same concept from a different angle. \
         Which sounds most useful?"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_reference_the_knowledge_point_title() {
        assert!(idle_prompt("Recursion").contains("Recursion"));
        assert!(failure_prompt("Recursion").contains("Recursion"));
    }

    #[test]
    fn failure_prompt_offers_three_options() {
        let prompt = failure_prompt("Recursion");
        for option in ["1)", "2)", "3)"] {
            assert!(prompt.contains(option));
        }
    }
}

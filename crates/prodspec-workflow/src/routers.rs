//! Decision functions for the conditional edges. Pure reads of the
//! merged state, so each is unit-testable against constructed states.

use crate::state::WorkflowState;

pub const CONTINUE: &str = "continue";
pub const END_RUN: &str = "end";
pub const RETRY: &str = "retry";
pub const GENERATE: &str = "generate";
pub const SKIP: &str = "skip";

/// An invalid problem statement ends the run before any generation.
pub fn after_validation(state: &WorkflowState) -> String {
    if state.core_problem.is_valid {
        CONTINUE.to_string()
    } else {
        END_RUN.to_string()
    }
}

/// Three identical errors in a row mean retrying is pointless; a small
/// number of errors earns another pass through generation; otherwise
/// proceed.
pub fn retry_or_abort(state: &WorkflowState) -> String {
    let recent: Vec<&String> = state.errors.iter().rev().take(3).collect();
    let repeating = recent.len() == 3 && recent.iter().all(|error| *error == recent[0]);
    if repeating {
        return END_RUN.to_string();
    }
    if !state.errors.is_empty() && state.errors.len() < 3 {
        return RETRY.to_string();
    }
    CONTINUE.to_string()
}

/// Documents need personas, solutions, and user stories to draw from.
pub fn should_generate_documents(state: &WorkflowState) -> String {
    let has_required_data = !state.personas.is_empty()
        && !state.solutions.is_empty()
        && !state.user_stories.is_empty();
    if has_required_data {
        GENERATE.to_string()
    } else {
        SKIP.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Level, Persona, Solution, TechLevel, UserStory};
    use std::collections::BTreeMap;

    fn state_with(errors: Vec<&str>) -> WorkflowState {
        let mut state = WorkflowState::new("p", None, &BTreeMap::new(), None)
            .expect("state construction should succeed");
        state.errors = errors.into_iter().map(String::from).collect();
        state
    }

    fn populated_state() -> WorkflowState {
        let mut state = state_with(Vec::new());
        state.personas = vec![Persona {
            id: "persona-1".to_string(),
            name: "Ada".to_string(),
            industry: "Finance".to_string(),
            role: "Analyst".to_string(),
            description: String::new(),
            pain_degree: 4,
            demographics: String::new(),
            goals: Vec::new(),
            pain_points: Vec::new(),
            tech_level: TechLevel::High,
        }];
        state.solutions = vec![Solution {
            id: "solution-1".to_string(),
            title: "Dashboard".to_string(),
            description: String::new(),
            complexity: Level::Medium,
            impact: Level::High,
            technical_approach: String::new(),
            business_impact: String::new(),
            target_personas: Vec::new(),
        }];
        state.user_stories = vec![UserStory {
            id: "story-1".to_string(),
            title: "Track invoices".to_string(),
            as_a: "freelancer".to_string(),
            i_want: "one dashboard".to_string(),
            so_that: "nothing slips".to_string(),
            acceptance_criteria: Vec::new(),
        }];
        state
    }

    #[test]
    fn after_validation_invalid_problem_expected_end() {
        let state = state_with(Vec::new());
        assert_eq!(after_validation(&state), END_RUN);
    }

    #[test]
    fn after_validation_valid_problem_expected_continue() {
        let mut state = state_with(Vec::new());
        state.core_problem.is_valid = true;
        assert_eq!(after_validation(&state), CONTINUE);
    }

    #[test]
    fn retry_or_abort_no_errors_expected_continue() {
        assert_eq!(retry_or_abort(&state_with(Vec::new())), CONTINUE);
    }

    #[test]
    fn retry_or_abort_few_errors_expected_retry() {
        assert_eq!(retry_or_abort(&state_with(vec!["a failed: x"])), RETRY);
        assert_eq!(
            retry_or_abort(&state_with(vec!["a failed: x", "b failed: y"])),
            RETRY
        );
    }

    #[test]
    fn retry_or_abort_three_identical_errors_expected_end() {
        let state = state_with(vec!["a failed: x", "a failed: x", "a failed: x"]);
        assert_eq!(retry_or_abort(&state), END_RUN);
    }

    #[test]
    fn retry_or_abort_three_distinct_errors_expected_continue() {
        let state = state_with(vec!["a failed: x", "b failed: y", "c failed: z"]);
        assert_eq!(retry_or_abort(&state), CONTINUE);
    }

    #[test]
    fn should_generate_documents_all_inputs_present_expected_generate() {
        assert_eq!(should_generate_documents(&populated_state()), GENERATE);
    }

    #[test]
    fn should_generate_documents_missing_stories_expected_skip() {
        let mut state = populated_state();
        state.user_stories.clear();
        assert_eq!(should_generate_documents(&state), SKIP);
    }

    #[test]
    fn router_same_state_expected_same_label() {
        let state = state_with(vec!["a failed: x"]);
        assert_eq!(retry_or_abort(&state), retry_or_abort(&state));
    }
}

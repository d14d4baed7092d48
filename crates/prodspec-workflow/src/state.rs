use crate::entities::{
    CoreProblem, Feature, LockedItems, MustHaveFeature, PainPoint, Persona, Solution, UserStory,
};
use crate::prompts::{DocumentKind, PromptKey, default_prompts};
use crate::WorkflowError;
use prodspec_engine::{
    StateChannels, append_dedup, merge_optional_appends, merge_optional_maps, replace_if_present,
    replace_list, shallow_merge, timestamp_now,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use uuid::Uuid;

/// The shared state threaded through the pipeline. Each field is a
/// channel with its own merge rule; steps return partial updates and
/// never assign the whole object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    pub run_id: String,
    pub core_problem: CoreProblem,
    pub personas: Vec<Persona>,
    pub pain_points: Vec<PainPoint>,
    pub solutions: Vec<Solution>,
    pub key_features: Vec<Feature>,
    pub must_have_features: Vec<MustHaveFeature>,
    pub user_stories: Vec<UserStory>,
    pub final_documents: BTreeMap<DocumentKind, String>,
    pub prompts: BTreeMap<PromptKey, String>,
    pub locked_items: LockedItems,
    pub current_step: String,
    pub errors: Vec<String>,
    pub metadata: BTreeMap<String, Value>,
}

/// Partial update: every channel mirrored as an `Option`, so an absent
/// collection is distinguishable from an intentionally emptied one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkflowUpdate {
    pub run_id: Option<String>,
    pub core_problem: Option<CoreProblem>,
    pub personas: Option<Vec<Persona>>,
    pub pain_points: Option<Vec<PainPoint>>,
    pub solutions: Option<Vec<Solution>>,
    pub key_features: Option<Vec<Feature>>,
    pub must_have_features: Option<Vec<MustHaveFeature>>,
    pub user_stories: Option<Vec<UserStory>>,
    pub final_documents: Option<BTreeMap<DocumentKind, String>>,
    pub prompts: Option<BTreeMap<PromptKey, String>>,
    pub locked_items: Option<LockedItems>,
    pub current_step: Option<String>,
    pub errors: Option<Vec<String>>,
    pub metadata: Option<BTreeMap<String, Value>>,
}

impl WorkflowState {
    /// Seed a fresh run. Prompt override keys are validated here so a
    /// mistyped key fails loudly instead of silently never applying.
    pub fn new(
        problem_statement: impl Into<String>,
        run_id: Option<String>,
        prompt_overrides: &BTreeMap<String, String>,
        locked_items: Option<LockedItems>,
    ) -> Result<Self, WorkflowError> {
        let mut prompts = default_prompts();
        for (key, template) in prompt_overrides {
            let parsed = PromptKey::parse(key)
                .ok_or_else(|| WorkflowError::UnknownPromptKey(key.clone()))?;
            prompts.insert(parsed, template.clone());
        }

        let problem_statement = problem_statement.into();
        Ok(Self {
            run_id: run_id.unwrap_or_else(|| format!("run-{}", Uuid::new_v4())),
            core_problem: CoreProblem {
                id: format!("problem-{}", Uuid::new_v4()),
                original_input: problem_statement.clone(),
                validated_statement: problem_statement,
                is_valid: false,
                feedback: None,
            },
            personas: Vec::new(),
            pain_points: Vec::new(),
            solutions: Vec::new(),
            key_features: Vec::new(),
            must_have_features: Vec::new(),
            user_stories: Vec::new(),
            final_documents: BTreeMap::new(),
            prompts,
            locked_items: locked_items.unwrap_or_default(),
            current_step: "initialize".to_string(),
            errors: Vec::new(),
            metadata: BTreeMap::from([("created_at".to_string(), json!(timestamp_now()))]),
        })
    }
}

fn merge_locked(mut current: LockedItems, next: Option<LockedItems>) -> LockedItems {
    let Some(next) = next else {
        return current;
    };
    current.personas.extend(next.personas);
    current.pain_points.extend(next.pain_points);
    current.solutions.extend(next.solutions);
    current
}

impl StateChannels for WorkflowState {
    type Update = WorkflowUpdate;

    fn apply(self, update: WorkflowUpdate) -> Self {
        Self {
            run_id: replace_if_present(self.run_id, update.run_id),
            core_problem: replace_if_present(self.core_problem, update.core_problem),
            personas: replace_list(self.personas, update.personas),
            pain_points: replace_list(self.pain_points, update.pain_points),
            solutions: replace_list(self.solutions, update.solutions),
            key_features: replace_list(self.key_features, update.key_features),
            must_have_features: replace_list(self.must_have_features, update.must_have_features),
            user_stories: replace_list(self.user_stories, update.user_stories),
            final_documents: shallow_merge(self.final_documents, update.final_documents),
            prompts: shallow_merge(self.prompts, update.prompts),
            locked_items: merge_locked(self.locked_items, update.locked_items),
            current_step: replace_if_present(self.current_step, update.current_step),
            errors: append_dedup(self.errors, update.errors),
            metadata: shallow_merge(self.metadata, update.metadata),
        }
    }

    fn merge_updates(first: WorkflowUpdate, second: WorkflowUpdate) -> WorkflowUpdate {
        WorkflowUpdate {
            run_id: second.run_id.or(first.run_id),
            core_problem: second.core_problem.or(first.core_problem),
            personas: second.personas.or(first.personas),
            pain_points: second.pain_points.or(first.pain_points),
            solutions: second.solutions.or(first.solutions),
            key_features: second.key_features.or(first.key_features),
            must_have_features: second.must_have_features.or(first.must_have_features),
            user_stories: second.user_stories.or(first.user_stories),
            final_documents: merge_optional_maps(first.final_documents, second.final_documents),
            prompts: merge_optional_maps(first.prompts, second.prompts),
            locked_items: match (first.locked_items, second.locked_items) {
                (Some(first), Some(second)) => Some(merge_locked(first, Some(second))),
                (first, second) => second.or(first),
            },
            current_step: second.current_step.or(first.current_step),
            errors: merge_optional_appends(first.errors, second.errors),
            metadata: merge_optional_maps(first.metadata, second.metadata),
        }
    }

    fn failure_update(step: &str, message: &str, detail: Value) -> WorkflowUpdate {
        WorkflowUpdate {
            errors: Some(vec![format!("{step} failed: {message}")]),
            metadata: Some(BTreeMap::from([(format!("{step}_error"), detail)])),
            ..WorkflowUpdate::default()
        }
    }

    fn mark_step(update: &mut WorkflowUpdate, step: &str) {
        if update.current_step.is_none() {
            update.current_step = Some(step.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn fresh_state() -> WorkflowState {
        WorkflowState::new("Invoices pile up", None, &BTreeMap::new(), None)
            .expect("state construction should succeed")
    }

    fn persona(name: &str) -> Persona {
        Persona {
            id: format!("persona-{name}"),
            name: name.to_string(),
            industry: "General".to_string(),
            role: "Tester".to_string(),
            description: String::new(),
            pain_degree: 3,
            demographics: String::new(),
            goals: Vec::new(),
            pain_points: Vec::new(),
            tech_level: crate::entities::TechLevel::Medium,
        }
    }

    #[test]
    fn new_state_expected_seeded_channels() {
        let state = fresh_state();
        assert!(state.run_id.starts_with("run-"));
        assert_eq!(state.core_problem.original_input, "Invoices pile up");
        assert!(!state.core_problem.is_valid);
        assert_eq!(state.current_step, "initialize");
        assert!(state.metadata.contains_key("created_at"));
        assert_eq!(state.prompts.len(), DocumentKind::ALL.len());
    }

    #[test]
    fn new_state_unknown_override_key_expected_error() {
        let overrides =
            BTreeMap::from([("generateRoadmap".to_string(), "irrelevant".to_string())]);
        let error = WorkflowState::new("p", None, &overrides, None)
            .expect_err("construction should fail");
        assert!(matches!(error, WorkflowError::UnknownPromptKey(key) if key == "generateRoadmap"));
    }

    #[test]
    fn new_state_valid_override_expected_default_replaced() {
        let overrides = BTreeMap::from([(
            "productVision".to_string(),
            "Focus on solo founders.".to_string(),
        )]);
        let state = WorkflowState::new("p", None, &overrides, None)
            .expect("construction should succeed");
        assert_eq!(
            state.prompts.get(&PromptKey::ProductVision).map(String::as_str),
            Some("Focus on solo founders.")
        );
    }

    #[test]
    fn apply_personas_update_expected_other_channels_untouched() {
        let state = fresh_state();
        let before_errors = state.errors.clone();
        let before_problem = state.core_problem.clone();

        let merged = state.apply(WorkflowUpdate {
            personas: Some(vec![persona("Ada")]),
            ..WorkflowUpdate::default()
        });

        assert_eq!(merged.personas.len(), 1);
        assert_eq!(merged.errors, before_errors);
        assert_eq!(merged.core_problem, before_problem);
        assert!(merged.solutions.is_empty());
    }

    #[test]
    fn apply_same_update_twice_expected_idempotent() {
        let update = WorkflowUpdate {
            personas: Some(vec![persona("Ada")]),
            errors: Some(vec!["step failed: once".to_string()]),
            final_documents: Some(BTreeMap::from([(
                DocumentKind::ProductVision,
                "# Vision".to_string(),
            )])),
            metadata: Some(BTreeMap::from([("k".to_string(), json!(1))])),
            ..WorkflowUpdate::default()
        };

        let once = fresh_state().apply(update.clone());
        let twice = once.clone().apply(update);
        assert_eq!(once, twice);
    }

    #[test]
    fn apply_list_update_expected_wholesale_replacement() {
        let state = fresh_state().apply(WorkflowUpdate {
            personas: Some(vec![persona("Ada"), persona("Grace")]),
            ..WorkflowUpdate::default()
        });
        let replaced = state.apply(WorkflowUpdate {
            personas: Some(vec![persona("Edsger")]),
            ..WorkflowUpdate::default()
        });
        assert_eq!(replaced.personas.len(), 1);
        assert_eq!(replaced.personas[0].name, "Edsger");
    }

    #[test]
    fn apply_update_without_locked_expected_locked_preserved() {
        let locked = LockedItems {
            personas: BTreeSet::from(["Ada the Analyst".to_string()]),
            ..LockedItems::default()
        };
        let state = WorkflowState::new("p", None, &BTreeMap::new(), Some(locked.clone()))
            .expect("construction should succeed");

        let merged = state.apply(WorkflowUpdate {
            personas: Some(vec![persona("Grace")]),
            ..WorkflowUpdate::default()
        });
        assert_eq!(merged.locked_items, locked);
    }

    #[test]
    fn merge_updates_expected_per_channel_semantics() {
        let first = WorkflowUpdate {
            personas: Some(vec![persona("Ada")]),
            errors: Some(vec!["a failed: x".to_string()]),
            current_step: Some("generate_personas".to_string()),
            ..WorkflowUpdate::default()
        };
        let second = WorkflowUpdate {
            personas: Some(vec![persona("Grace")]),
            errors: Some(vec!["b failed: y".to_string()]),
            current_step: Some("generate_pain_points".to_string()),
            ..WorkflowUpdate::default()
        };

        let merged = WorkflowState::merge_updates(first, second);
        assert_eq!(merged.personas.as_ref().map(Vec::len), Some(1));
        assert_eq!(merged.personas.unwrap()[0].name, "Grace");
        assert_eq!(
            merged.errors,
            Some(vec!["a failed: x".to_string(), "b failed: y".to_string()])
        );
        assert_eq!(merged.current_step.as_deref(), Some("generate_pain_points"));
    }

    #[test]
    fn failure_update_expected_error_entry_and_detail() {
        let update = WorkflowState::failure_update(
            "generate_personas",
            "generator unavailable",
            json!({"attempt": 3}),
        );
        assert_eq!(
            update.errors,
            Some(vec!["generate_personas failed: generator unavailable".to_string()])
        );
        assert!(
            update
                .metadata
                .expect("detail expected")
                .contains_key("generate_personas_error")
        );
    }

    #[test]
    fn mark_step_expected_node_supplied_step_wins() {
        let mut update = WorkflowUpdate {
            current_step: Some("completed".to_string()),
            ..WorkflowUpdate::default()
        };
        WorkflowState::mark_step(&mut update, "save_final_state");
        assert_eq!(update.current_step.as_deref(), Some("completed"));

        let mut unmarked = WorkflowUpdate::default();
        WorkflowState::mark_step(&mut unmarked, "validate_problem");
        assert_eq!(unmarked.current_step.as_deref(), Some("validate_problem"));
    }

    #[test]
    fn state_serde_round_trip_expected_checkpoint_compatible() {
        let state = fresh_state().apply(WorkflowUpdate {
            final_documents: Some(BTreeMap::from([(
                DocumentKind::ProductVision,
                "# Vision".to_string(),
            )])),
            ..WorkflowUpdate::default()
        });

        let raw = serde_json::to_string(&state).expect("serialization should succeed");
        assert!(raw.contains("\"coreProblem\""));
        assert!(raw.contains("\"productVision\""));
        let restored: WorkflowState =
            serde_json::from_str(&raw).expect("deserialization should succeed");
        assert_eq!(restored, state);
    }
}

//! Focus-group sub-pipeline: a simulated feature vote over the top
//! solutions, followed by user-story generation.

use crate::entities::{Feature, MustHaveFeature, PersonaComment, UserStory};
use crate::responses::UserStoriesResponse;
use crate::state::{WorkflowState, WorkflowUpdate};
use async_trait::async_trait;
use prodspec_engine::{CompiledGraph, END, EngineError, GraphBuilder, NodeHandler};
use prodspec_llm::{CallOptions, JsonValidator, SchemaClient};
use std::sync::Arc;
use uuid::Uuid;

/// Derives key features from the top three solutions and annotates the
/// must-have set with persona reactions. Pure over the state, no
/// generation call.
struct DeriveFeatures;

#[async_trait]
impl NodeHandler<WorkflowState> for DeriveFeatures {
    async fn run(&self, state: &WorkflowState) -> Result<WorkflowUpdate, EngineError> {
        let first_persona_id = state
            .personas
            .first()
            .map(|p| p.id.clone())
            .unwrap_or_default();

        let key_features: Vec<Feature> = state
            .solutions
            .iter()
            .take(3)
            .enumerate()
            .map(|(index, solution)| Feature {
                id: format!("feature-{}", Uuid::new_v4()),
                text: format!("Key feature from {}", solution.title),
                source_solution_id: solution.id.clone(),
                source_persona_id: first_persona_id.clone(),
                votes: 5 - index as u32,
            })
            .collect();

        let must_have_features: Vec<MustHaveFeature> = key_features
            .iter()
            .cloned()
            .map(|feature| {
                let comments = state
                    .personas
                    .iter()
                    .take(2)
                    .map(|persona| PersonaComment {
                        persona_id: persona.id.clone(),
                        persona_name: persona.name.clone(),
                        comment: format!(
                            "This feature would help with {}",
                            persona
                                .pain_points
                                .first()
                                .map(String::as_str)
                                .unwrap_or("main issues")
                        ),
                    })
                    .collect();
                MustHaveFeature::from_feature(feature, comments)
            })
            .collect();

        Ok(WorkflowUpdate {
            key_features: Some(key_features),
            must_have_features: Some(must_have_features),
            ..WorkflowUpdate::default()
        })
    }
}

struct GenerateUserStories {
    client: Arc<SchemaClient>,
}

#[async_trait]
impl NodeHandler<WorkflowState> for GenerateUserStories {
    async fn run(&self, state: &WorkflowState) -> Result<WorkflowUpdate, EngineError> {
        let persona_names = state
            .personas
            .iter()
            .map(|p| format!("{} ({})", p.name, p.role))
            .collect::<Vec<_>>()
            .join(", ");

        let prompt = format!(
            "Based on this problem and the personas, create 6 user stories.\n\n\
             Problem: {}\n\
             Personas: {persona_names}\n\n\
             Return JSON: {{\n\
               \"userStories\": [{{\n\
                 \"title\": \"string\",\n\
                 \"asA\": \"string\",\n\
                 \"iWant\": \"string\",\n\
                 \"soThat\": \"string\",\n\
                 \"acceptanceCriteria\": [\"string\"]\n\
               }}]\n\
             }}",
            state.core_problem.validated_statement
        );

        let validator = JsonValidator::<UserStoriesResponse>::new();
        let result = self
            .client
            .call_with_schema("user_stories", &prompt, &validator, &CallOptions::default())
            .await
            .map_err(EngineError::runtime)?;

        let user_stories: Vec<UserStory> = result
            .user_stories
            .into_iter()
            .map(|draft| UserStory {
                id: format!("story-{}", Uuid::new_v4()),
                title: draft.title,
                as_a: draft.as_a,
                i_want: draft.i_want,
                so_that: draft.so_that,
                acceptance_criteria: draft.acceptance_criteria,
            })
            .collect();

        Ok(WorkflowUpdate {
            user_stories: Some(user_stories),
            current_step: Some("focus_group_complete".to_string()),
            ..WorkflowUpdate::default()
        })
    }
}

pub fn focus_group_graph(
    client: Arc<SchemaClient>,
) -> Result<CompiledGraph<WorkflowState>, EngineError> {
    GraphBuilder::new("focus_group")
        .add_node("derive_features", Arc::new(DeriveFeatures))
        .add_node("user_stories", Arc::new(GenerateUserStories { client }))
        .add_edge("derive_features", "user_stories")
        .add_edge("user_stories", END)
        .set_entry("derive_features")
        .compile()
}

use crate::entities::{Persona, TechLevel};
use crate::nodes::GENERATE_PERSONAS;
use crate::responses::PersonaGenerationResponse;
use crate::state::{WorkflowState, WorkflowUpdate};
use async_trait::async_trait;
use prodspec_engine::{EngineError, NodeHandler};
use prodspec_llm::{CallOptions, JsonValidator, SchemaClient};
use std::sync::Arc;
use uuid::Uuid;

pub struct GeneratePersonas {
    client: Arc<SchemaClient>,
}

impl GeneratePersonas {
    pub fn new(client: Arc<SchemaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NodeHandler<WorkflowState> for GeneratePersonas {
    async fn run(&self, state: &WorkflowState) -> Result<WorkflowUpdate, EngineError> {
        let locked = &state.locked_items.personas;
        let avoid_clause = if locked.is_empty() {
            String::new()
        } else {
            format!(
                "\n\nAvoid creating personas similar to these existing ones:\n{}",
                locked.iter().cloned().collect::<Vec<_>>().join(", ")
            )
        };

        let prompt = format!(
            "Based on this validated problem, generate 5 diverse user personas who would \
             be most affected by this issue.\n\n\
             Problem: \"{}\"{avoid_clause}\n\n\
             Each persona should have:\n\
             - Unique background and role\n\
             - Specific pain points related to the problem\n\
             - Clear goals and motivations\n\
             - Varied technical expertise levels\n\
             - Pain degree rating (1-5, where 5 is most affected)\n\n\
             Return JSON with structure:\n\
             {{\n\
               \"personas\": [{{\n\
                 \"name\": \"string\",\n\
                 \"industry\": \"string\",\n\
                 \"role\": \"string\",\n\
                 \"description\": \"string\",\n\
                 \"painDegree\": number (1-5),\n\
                 \"demographics\": \"string\",\n\
                 \"goals\": [\"string\"],\n\
                 \"pain_points\": [\"string\"],\n\
                 \"tech_level\": \"low|medium|high\"\n\
               }}]\n\
             }}",
            state.core_problem.validated_statement
        );

        let validator = JsonValidator::<PersonaGenerationResponse>::new();
        let result = self
            .client
            .call_with_schema(GENERATE_PERSONAS, &prompt, &validator, &CallOptions::default())
            .await
            .map_err(EngineError::runtime)?;

        let personas: Vec<Persona> = result
            .personas
            .into_iter()
            .map(|draft| Persona {
                id: format!("persona-{}", Uuid::new_v4()),
                name: draft.name,
                industry: if draft.industry.is_empty() {
                    "General".to_string()
                } else {
                    draft.industry
                },
                role: draft.role,
                description: draft.description,
                pain_degree: draft
                    .pain_degree
                    .map(|degree| degree.round().clamp(1.0, 5.0) as u8)
                    .unwrap_or(3),
                demographics: draft.demographics.unwrap_or_default(),
                goals: draft.goals.unwrap_or_default(),
                pain_points: draft.pain_points.unwrap_or_default(),
                tech_level: draft
                    .tech_level
                    .as_deref()
                    .map(TechLevel::parse_lenient)
                    .unwrap_or_default(),
            })
            .collect();

        Ok(WorkflowUpdate {
            personas: Some(personas),
            ..WorkflowUpdate::default()
        })
    }
}

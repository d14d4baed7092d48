use crate::entities::PainPoint;
use crate::nodes::GENERATE_PAIN_POINTS;
use crate::responses::PainPointGenerationResponse;
use crate::state::{WorkflowState, WorkflowUpdate};
use async_trait::async_trait;
use prodspec_engine::{EngineError, NodeHandler};
use prodspec_llm::{CallOptions, JsonValidator, SchemaClient};
use std::sync::Arc;
use uuid::Uuid;

pub struct GeneratePainPoints {
    client: Arc<SchemaClient>,
}

impl GeneratePainPoints {
    pub fn new(client: Arc<SchemaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NodeHandler<WorkflowState> for GeneratePainPoints {
    async fn run(&self, state: &WorkflowState) -> Result<WorkflowUpdate, EngineError> {
        let persona_lines = state
            .personas
            .iter()
            .map(|p| format!("{} ({}): {}", p.name, p.role, p.description))
            .collect::<Vec<_>>()
            .join("\n");

        let locked = &state.locked_items.pain_points;
        let avoid_clause = if locked.is_empty() {
            String::new()
        } else {
            format!(
                "\n\nAvoid duplicating these existing pain points:\n{}",
                locked.iter().cloned().collect::<Vec<_>>().join(", ")
            )
        };

        let prompt = format!(
            "Based on this validated problem and the personas, generate specific pain \
             points that these users experience.\n\n\
             Problem: \"{}\"\n\n\
             Personas: {persona_lines}{avoid_clause}\n\n\
             Generate 8-10 specific pain points with:\n\
             - Clear, actionable descriptions\n\
             - Severity levels (low, medium, high, critical)\n\
             - Impact areas (workflow, communication, efficiency, etc.)\n\
             - Optional persona association\n\n\
             Return JSON with structure:\n\
             {{\n\
               \"painPoints\": [{{\n\
                 \"description\": \"specific pain point description\",\n\
                 \"severity\": \"low|medium|high|critical\",\n\
                 \"impactArea\": \"impact area name\",\n\
                 \"persona_id\": \"optional persona id\"\n\
               }}]\n\
             }}",
            state.core_problem.validated_statement
        );

        let validator = JsonValidator::<PainPointGenerationResponse>::new();
        let result = self
            .client
            .call_with_schema(
                GENERATE_PAIN_POINTS,
                &prompt,
                &validator,
                &CallOptions::default(),
            )
            .await
            .map_err(EngineError::runtime)?;

        let pain_points: Vec<PainPoint> = result
            .pain_points
            .into_iter()
            .map(|draft| PainPoint {
                id: format!("painpoint-{}", Uuid::new_v4()),
                description: draft.description,
                severity: draft.severity,
                impact_area: draft.impact_area,
                persona_id: draft.persona_id,
            })
            .collect();

        Ok(WorkflowUpdate {
            pain_points: Some(pain_points),
            ..WorkflowUpdate::default()
        })
    }
}

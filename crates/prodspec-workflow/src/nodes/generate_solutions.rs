use crate::entities::Solution;
use crate::nodes::GENERATE_SOLUTIONS;
use crate::responses::SolutionGenerationResponse;
use crate::state::{WorkflowState, WorkflowUpdate};
use async_trait::async_trait;
use prodspec_engine::{EngineError, NodeHandler};
use prodspec_llm::{CallOptions, JsonValidator, SchemaClient};
use std::sync::Arc;
use uuid::Uuid;

pub struct GenerateSolutions {
    client: Arc<SchemaClient>,
}

impl GenerateSolutions {
    pub fn new(client: Arc<SchemaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NodeHandler<WorkflowState> for GenerateSolutions {
    async fn run(&self, state: &WorkflowState) -> Result<WorkflowUpdate, EngineError> {
        let pain_point_lines = state
            .pain_points
            .iter()
            .map(|pp| format!("{} ({})", pp.description, pp.severity.as_str()))
            .collect::<Vec<_>>()
            .join("\n");
        let persona_names = state
            .personas
            .iter()
            .map(|p| format!("{} ({})", p.name, p.role))
            .collect::<Vec<_>>()
            .join(", ");

        let locked = &state.locked_items.solutions;
        let avoid_clause = if locked.is_empty() {
            String::new()
        } else {
            format!(
                "\n\nAvoid duplicating these existing solutions:\n{}",
                locked.iter().cloned().collect::<Vec<_>>().join(", ")
            )
        };

        let prompt = format!(
            "Based on the validated problem, personas, and pain points, generate \
             innovative solutions that address the core issues.\n\n\
             Problem: \"{}\"\n\n\
             Key Pain Points: {pain_point_lines}\n\n\
             Target Personas: {persona_names}{avoid_clause}\n\n\
             Generate 6-8 diverse solutions with:\n\
             - Creative and practical approaches\n\
             - Different complexity levels (low, medium, high)\n\
             - Varied impact potential (low, medium, high)\n\
             - Clear technical approaches\n\
             - Business impact explanations\n\
             - Target persona mappings\n\n\
             Return JSON with structure:\n\
             {{\n\
               \"solutions\": [{{\n\
                 \"title\": \"solution title\",\n\
                 \"description\": \"detailed solution description\",\n\
                 \"complexity\": \"low|medium|high\",\n\
                 \"impact\": \"low|medium|high\",\n\
                 \"technical_approach\": \"how to implement technically\",\n\
                 \"business_impact\": \"business value explanation\",\n\
                 \"target_personas\": [\"persona names this solution addresses\"]\n\
               }}]\n\
             }}",
            state.core_problem.validated_statement
        );

        let validator = JsonValidator::<SolutionGenerationResponse>::new();
        let result = self
            .client
            .call_with_schema(GENERATE_SOLUTIONS, &prompt, &validator, &CallOptions::default())
            .await
            .map_err(EngineError::runtime)?;

        let solutions: Vec<Solution> = result
            .solutions
            .into_iter()
            .map(|draft| Solution {
                id: format!("solution-{}", Uuid::new_v4()),
                title: draft.title,
                description: draft.description,
                complexity: draft.complexity,
                impact: draft.impact,
                technical_approach: draft.technical_approach,
                business_impact: draft.business_impact,
                target_personas: draft.target_personas,
            })
            .collect();

        Ok(WorkflowUpdate {
            solutions: Some(solutions),
            ..WorkflowUpdate::default()
        })
    }
}

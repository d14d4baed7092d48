use crate::nodes::VALIDATE_PROBLEM;
use crate::responses::ProblemValidationResponse;
use crate::state::{WorkflowState, WorkflowUpdate};
use async_trait::async_trait;
use prodspec_engine::{EngineError, NodeHandler};
use prodspec_llm::{CallOptions, JsonValidator, SchemaClient};
use std::sync::Arc;

/// Refines the raw problem statement and decides whether it can guide
/// the rest of the pipeline.
pub struct ValidateProblem {
    client: Arc<SchemaClient>,
}

impl ValidateProblem {
    pub fn new(client: Arc<SchemaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NodeHandler<WorkflowState> for ValidateProblem {
    async fn run(&self, state: &WorkflowState) -> Result<WorkflowUpdate, EngineError> {
        let prompt = format!(
            "Analyze this problem statement and provide validation feedback.\n\n\
             Problem Statement: \"{}\"\n\n\
             Evaluate if this is a clear, actionable problem statement that could guide \
             product development. Provide constructive feedback and a refined version.\n\n\
             Respond with JSON matching this structure:\n\
             {{\n\
               \"isValid\": boolean,\n\
               \"feedback\": \"constructive feedback string\",\n\
               \"validatedProblem\": \"refined, actionable problem statement\"\n\
             }}",
            state.core_problem.original_input
        );

        let validator = JsonValidator::<ProblemValidationResponse>::new();
        let analysis = self
            .client
            .call_with_schema(VALIDATE_PROBLEM, &prompt, &validator, &CallOptions::default())
            .await
            .map_err(EngineError::runtime)?;

        let mut core_problem = state.core_problem.clone();
        core_problem.is_valid = analysis.is_valid;
        core_problem.feedback = Some(analysis.feedback);
        core_problem.validated_statement = analysis.validated_problem;

        Ok(WorkflowUpdate {
            core_problem: Some(core_problem),
            ..WorkflowUpdate::default()
        })
    }
}

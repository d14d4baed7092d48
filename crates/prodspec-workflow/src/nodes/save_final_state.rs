use crate::WorkflowError;
use crate::state::{WorkflowState, WorkflowUpdate};
use async_trait::async_trait;
use prodspec_engine::{EngineError, NodeHandler, timestamp_now};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Where the finished run goes. The pipeline calls it exactly once, at
/// the end; what sits behind it (database, file, API) is a caller
/// concern.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn save(
        &self,
        run_id: &str,
        result_type: &str,
        content: &str,
        metadata: &str,
    ) -> Result<(), WorkflowError>;
}

pub struct SaveFinalState {
    sink: Arc<dyn PersistenceSink>,
}

impl SaveFinalState {
    pub fn new(sink: Arc<dyn PersistenceSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl NodeHandler<WorkflowState> for SaveFinalState {
    async fn run(&self, state: &WorkflowState) -> Result<WorkflowUpdate, EngineError> {
        let content = serde_json::to_string(&json!({
            "coreProblem": state.core_problem,
            "personas": state.personas,
            "painPoints": state.pain_points,
            "solutions": state.solutions,
            "keyFeatures": state.key_features,
            "mustHaveFeatures": state.must_have_features,
            "userStories": state.user_stories,
            "finalDocuments": state.final_documents,
        }))
        .map_err(EngineError::runtime)?;

        let completed_at = timestamp_now();
        let mut metadata = state.metadata.clone();
        metadata.insert("completed_at".to_string(), json!(completed_at));
        metadata.insert("workflow_version".to_string(), json!("2.0"));
        metadata.insert("total_personas".to_string(), json!(state.personas.len()));
        metadata.insert("total_solutions".to_string(), json!(state.solutions.len()));
        metadata.insert(
            "total_user_stories".to_string(),
            json!(state.user_stories.len()),
        );
        metadata.insert(
            "documents_generated".to_string(),
            json!(state.final_documents.len()),
        );
        let metadata = serde_json::to_string(&metadata).map_err(EngineError::runtime)?;

        self.sink
            .save(&state.run_id, "complete_workflow", &content, &metadata)
            .await
            .map_err(EngineError::runtime)?;

        Ok(WorkflowUpdate {
            current_step: Some("completed".to_string()),
            metadata: Some(BTreeMap::from([
                ("completed_at".to_string(), json!(completed_at)),
                ("workflow_completed".to_string(), json!(true)),
            ])),
            ..WorkflowUpdate::default()
        })
    }
}

//! Document-generation sub-pipeline: one node per document kind, run in
//! a fixed order. A failed generation degrades to a placeholder carrying
//! the error, so one bad document never costs the other five.

use crate::prompts::DocumentKind;
use crate::responses::DocumentResponse;
use crate::state::{WorkflowState, WorkflowUpdate};
use async_trait::async_trait;
use prodspec_engine::{CompiledGraph, END, EngineError, GraphBuilder, NodeHandler};
use prodspec_llm::{CallOptions, JsonValidator, SchemaClient};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

struct GenerateDocument {
    kind: DocumentKind,
    client: Arc<SchemaClient>,
}

#[async_trait]
impl NodeHandler<WorkflowState> for GenerateDocument {
    async fn run(&self, state: &WorkflowState) -> Result<WorkflowUpdate, EngineError> {
        let template = state
            .prompts
            .get(&self.kind.prompt_key())
            .cloned()
            .unwrap_or_else(|| {
                format!(
                    "Create a comprehensive {} document based on the provided context.",
                    self.kind.display_name()
                )
            });

        let context = json!({
            "problem": state.core_problem.validated_statement,
            "personas": state
                .personas
                .iter()
                .map(|p| format!("{} ({}): {}", p.name, p.role, p.description))
                .collect::<Vec<_>>(),
            "solutions": state
                .solutions
                .iter()
                .map(|s| format!("{}: {}", s.title, s.description))
                .collect::<Vec<_>>(),
            "userStories": state
                .user_stories
                .iter()
                .map(|us| format!(
                    "{}: As a {}, I want {} so that {}",
                    us.title, us.as_a, us.i_want, us.so_that
                ))
                .collect::<Vec<_>>(),
            "mustHaveFeatures": state
                .must_have_features
                .iter()
                .map(|f| f.text.clone())
                .collect::<Vec<_>>(),
        });
        let context = serde_json::to_string_pretty(&context).map_err(EngineError::runtime)?;

        let prompt = format!(
            "Generate a {} document based on this context and template.\n\n\
             Context:\n{context}\n\n\
             Template Instructions: {template}\n\n\
             Return a well-structured document in JSON format:\n\
             {{\n\
               \"title\": \"document title\",\n\
               \"content\": \"complete document content in markdown format\"\n\
             }}",
            self.kind.display_name()
        );

        let validator = JsonValidator::<DocumentResponse>::new();
        let content = match self
            .client
            .call_with_schema(
                self.kind.node_name(),
                &prompt,
                &validator,
                &CallOptions::default(),
            )
            .await
        {
            Ok(document) => document.content,
            Err(error) => format!(
                "# {}\n\nError generating document: {error}",
                self.kind.display_name()
            ),
        };

        let mut update = WorkflowUpdate {
            final_documents: Some(BTreeMap::from([(self.kind, content)])),
            ..WorkflowUpdate::default()
        };
        if self.kind == DocumentKind::DesignSystem {
            update.current_step = Some("documents_complete".to_string());
        }
        Ok(update)
    }
}

pub fn document_generation_graph(
    client: Arc<SchemaClient>,
) -> Result<CompiledGraph<WorkflowState>, EngineError> {
    let mut builder = GraphBuilder::new("document_generation");
    for kind in DocumentKind::ALL {
        builder = builder.add_node(
            kind.node_name(),
            Arc::new(GenerateDocument {
                kind,
                client: Arc::clone(&client),
            }),
        );
    }
    for pair in DocumentKind::ALL.windows(2) {
        builder = builder.add_edge(pair[0].node_name(), pair[1].node_name());
    }
    builder
        .add_edge(DocumentKind::DesignSystem.node_name(), END)
        .set_entry(DocumentKind::ProductVision.node_name())
        .compile()
}

#[cfg(test)]
mod tests {
    use super::*;
    use prodspec_llm::{GenerateOptions, LlmError, TextGenerator};

    struct AlwaysFails;

    #[async_trait]
    impl TextGenerator for AlwaysFails {
        async fn generate(
            &self,
            _prompt: &str,
            _options: &GenerateOptions,
        ) -> Result<String, LlmError> {
            Err(LlmError::Generation("model offline".to_string()))
        }
    }

    #[test]
    fn document_generation_graph_expected_compiles_with_six_nodes() {
        let client = Arc::new(SchemaClient::new(Arc::new(AlwaysFails)));
        let graph = document_generation_graph(client).expect("graph should compile");
        assert_eq!(graph.node_names().count(), DocumentKind::ALL.len());
        assert_eq!(graph.entry(), "product_vision");
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn generate_document_failure_expected_placeholder_not_error() {
        let node = GenerateDocument {
            kind: DocumentKind::ProductVision,
            client: Arc::new(SchemaClient::new(Arc::new(AlwaysFails))),
        };
        let state = WorkflowState::new("p", None, &BTreeMap::new(), None)
            .expect("state construction should succeed");

        let update = node.run(&state).await.expect("node should not fail");
        let documents = update.final_documents.expect("documents expected");
        let content = documents
            .get(&DocumentKind::ProductVision)
            .expect("placeholder expected");
        assert!(content.starts_with("# Product Vision"));
        assert!(content.contains("Error generating document"));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn generate_last_document_expected_documents_complete_step() {
        let node = GenerateDocument {
            kind: DocumentKind::DesignSystem,
            client: Arc::new(SchemaClient::new(Arc::new(AlwaysFails))),
        };
        let state = WorkflowState::new("p", None, &BTreeMap::new(), None)
            .expect("state construction should succeed");

        let update = node.run(&state).await.expect("node should not fail");
        assert_eq!(update.current_step.as_deref(), Some("documents_complete"));
    }
}

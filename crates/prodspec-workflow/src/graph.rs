use crate::nodes::{
    FOCUS_GROUP, GENERATE_DOCUMENTS, GENERATE_PAIN_POINTS, GENERATE_PERSONAS, GENERATE_SOLUTIONS,
    GeneratePainPoints, GeneratePersonas, GenerateSolutions, PersistenceSink, SAVE_FINAL_STATE,
    SaveFinalState, VALIDATE_PROBLEM, ValidateProblem,
};
use crate::routers::{
    CONTINUE, END_RUN, GENERATE, RETRY, SKIP, after_validation, retry_or_abort,
    should_generate_documents,
};
use crate::state::WorkflowState;
use crate::subgraphs::{document_generation_graph, focus_group_graph};
use prodspec_engine::{CompiledGraph, END, EngineError, GraphBuilder, router};
use prodspec_llm::SchemaClient;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Assembles the full product-spec pipeline. Structural mistakes in the
/// wiring surface here, synchronously, before anything runs.
///
/// After the solution step a retry router inspects the error channel:
/// accumulated step failures send the run back through generation,
/// persistent identical failures divert straight to persistence so the
/// degraded state is still saved. The "skip" branch after the focus
/// group does the same.
pub fn build_workflow_graph(
    client: Arc<SchemaClient>,
    sink: Arc<dyn PersistenceSink>,
) -> Result<CompiledGraph<WorkflowState>, EngineError> {
    let focus_group = focus_group_graph(Arc::clone(&client))?;
    let documents = document_generation_graph(Arc::clone(&client))?;

    GraphBuilder::new("product_spec")
        .add_node(VALIDATE_PROBLEM, Arc::new(ValidateProblem::new(Arc::clone(&client))))
        .add_node(GENERATE_PERSONAS, Arc::new(GeneratePersonas::new(Arc::clone(&client))))
        .add_node(
            GENERATE_PAIN_POINTS,
            Arc::new(GeneratePainPoints::new(Arc::clone(&client))),
        )
        .add_node(
            GENERATE_SOLUTIONS,
            Arc::new(GenerateSolutions::new(Arc::clone(&client))),
        )
        .add_node(FOCUS_GROUP, Arc::new(focus_group.into_node()))
        .add_node(GENERATE_DOCUMENTS, Arc::new(documents.into_node()))
        .add_node(SAVE_FINAL_STATE, Arc::new(SaveFinalState::new(sink)))
        .add_conditional_edges(
            VALIDATE_PROBLEM,
            router(after_validation),
            BTreeMap::from([
                (CONTINUE.to_string(), GENERATE_PERSONAS.to_string()),
                (END_RUN.to_string(), END.to_string()),
            ]),
        )
        .add_edge(GENERATE_PERSONAS, GENERATE_PAIN_POINTS)
        .add_edge(GENERATE_PAIN_POINTS, GENERATE_SOLUTIONS)
        .add_conditional_edges(
            GENERATE_SOLUTIONS,
            router(retry_or_abort),
            BTreeMap::from([
                (CONTINUE.to_string(), FOCUS_GROUP.to_string()),
                (RETRY.to_string(), GENERATE_PERSONAS.to_string()),
                (END_RUN.to_string(), SAVE_FINAL_STATE.to_string()),
            ]),
        )
        .add_conditional_edges(
            FOCUS_GROUP,
            router(should_generate_documents),
            BTreeMap::from([
                (GENERATE.to_string(), GENERATE_DOCUMENTS.to_string()),
                (SKIP.to_string(), SAVE_FINAL_STATE.to_string()),
            ]),
        )
        .add_edge(GENERATE_DOCUMENTS, SAVE_FINAL_STATE)
        .add_edge(SAVE_FINAL_STATE, END)
        .set_entry(VALIDATE_PROBLEM)
        .compile()
}

use crate::WorkflowError;
use crate::entities::LockedItems;
use crate::graph::build_workflow_graph;
use crate::nodes::PersistenceSink;
use crate::state::WorkflowState;
use prodspec_engine::{
    CheckpointStore, EventSink, PipelineRunner, RunConfig, RunEventReceiver, RunReport,
    SharedRunEventObserver,
};
use prodspec_llm::{SchemaClient, TextGenerator};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Everything a run needs beyond the problem statement. Defaults give
/// an ephemeral, uncancellable, unobserved run.
#[derive(Clone)]
pub struct WorkflowOptions {
    /// Stable id for checkpointed resumption; generated when absent.
    pub run_id: Option<String>,
    /// Prompt template overrides, keyed by recognized prompt key.
    pub prompt_overrides: BTreeMap<String, String>,
    pub locked_items: Option<LockedItems>,
    pub checkpoints: Option<Arc<dyn CheckpointStore<WorkflowState>>>,
    pub cancel: CancellationToken,
    pub observer: Option<SharedRunEventObserver<WorkflowState>>,
    pub max_steps: u32,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            run_id: None,
            prompt_overrides: BTreeMap::new(),
            locked_items: None,
            checkpoints: None,
            cancel: CancellationToken::new(),
            observer: None,
            max_steps: 256,
        }
    }
}

fn build_config(options: &WorkflowOptions, run_id: String) -> RunConfig<WorkflowState> {
    let mut events = EventSink::default();
    if let Some(observer) = options.observer.clone() {
        events = events.observer(observer);
    }
    RunConfig {
        run_id: Some(run_id),
        checkpoints: options.checkpoints.clone(),
        events,
        cancel: options.cancel.clone(),
        max_steps: options.max_steps,
    }
}

/// One-shot execution: walk the pipeline to the end and return the
/// final report. Step failures surface in the state's error channel,
/// not as an `Err`.
pub async fn run_workflow(
    problem_statement: &str,
    generator: Arc<dyn TextGenerator>,
    sink: Arc<dyn PersistenceSink>,
    options: WorkflowOptions,
) -> Result<RunReport<WorkflowState>, WorkflowError> {
    let client = Arc::new(SchemaClient::new(generator));
    let graph = build_workflow_graph(client, sink)?;
    let state = WorkflowState::new(
        problem_statement,
        options.run_id.clone(),
        &options.prompt_overrides,
        options.locked_items.clone(),
    )?;
    let config = build_config(&options, state.run_id.clone());
    Ok(PipelineRunner.run(&graph, state, config).await?)
}

/// Streaming execution: the run proceeds on a spawned task while the
/// returned receiver yields lifecycle events, one node-completed event
/// (carrying the merged state) per node.
pub fn stream_workflow(
    problem_statement: &str,
    generator: Arc<dyn TextGenerator>,
    sink: Arc<dyn PersistenceSink>,
    options: WorkflowOptions,
) -> Result<
    (
        RunEventReceiver<WorkflowState>,
        JoinHandle<Result<RunReport<WorkflowState>, prodspec_engine::EngineError>>,
    ),
    WorkflowError,
> {
    let client = Arc::new(SchemaClient::new(generator));
    let graph = Arc::new(build_workflow_graph(client, sink)?);
    let state = WorkflowState::new(
        problem_statement,
        options.run_id.clone(),
        &options.prompt_overrides,
        options.locked_items.clone(),
    )?;
    let config = build_config(&options, state.run_id.clone());
    Ok(PipelineRunner.stream(graph, state, config))
}

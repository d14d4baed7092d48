use crate::graph::EdgeSpec;
use crate::{
    Checkpoint, CheckpointStore, CompiledGraph, END, EngineError, EventSink, RunEvent,
    RunEventReceiver, StateChannels, execute_step, run_event_channel, timestamp_now,
};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct RunConfig<S: StateChannels> {
    pub run_id: Option<String>,
    pub checkpoints: Option<Arc<dyn CheckpointStore<S>>>,
    pub events: EventSink<S>,
    pub cancel: CancellationToken,
    /// Safety valve against cyclic routing: the walk refuses to invoke
    /// more than this many nodes and ends the run with an error entry.
    pub max_steps: u32,
}

impl<S: StateChannels> Default for RunConfig<S> {
    fn default() -> Self {
        Self {
            run_id: None,
            checkpoints: None,
            events: EventSink::default(),
            cancel: CancellationToken::new(),
            max_steps: 256,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Cancelled,
    Failed,
}

/// Outcome of a run: the final merged state plus the traversal record.
/// Step-level failures do not fail the run; they live in the state's
/// error channel. `Failed` here means the walk itself gave up (step
/// valve exceeded).
#[derive(Clone, Debug)]
pub struct RunReport<S: StateChannels> {
    pub run_id: String,
    pub status: RunStatus,
    pub failure_reason: Option<String>,
    pub completed_nodes: Vec<String>,
    pub state: S,
}

pub(crate) struct WalkOutcome<S: StateChannels> {
    pub report: RunReport<S>,
    pub update: S::Update,
}

/// Sequential interpreter over a compiled plan: cancellation check,
/// wrapped step invocation, reducer merge, checkpoint, route, repeat
/// until the terminal marker. Node N+1 never begins before node N's
/// partial update has been merged.
pub(crate) async fn walk<S: StateChannels>(
    graph: &CompiledGraph<S>,
    initial: S,
    mut config: RunConfig<S>,
) -> Result<WalkOutcome<S>, EngineError> {
    let run_id = config
        .run_id
        .take()
        .unwrap_or_else(|| format!("{}-run", graph.name));
    let events = config.events.clone();

    let mut state = initial;
    let mut cumulative = S::Update::default();
    let mut completed_nodes: Vec<String> = Vec::new();
    let mut current: String = graph.entry.clone();
    let mut resumed = false;

    if let Some(store) = config.checkpoints.as_ref() {
        if let Some(saved) = store.load(&run_id).await? {
            state = saved.state;
            completed_nodes = saved.completed_nodes;
            match saved.next_node {
                Some(next) => {
                    if !graph.nodes.contains_key(&next) {
                        return Err(EngineError::checkpoint(format!(
                            "checkpoint for '{run_id}' points to unknown node '{next}'"
                        )));
                    }
                    events.emit(RunEvent::RunResumed {
                        run_id: run_id.clone(),
                        graph: graph.name.clone(),
                        next_node: next.clone(),
                    });
                    current = next;
                    resumed = true;
                }
                None => {
                    // The checkpointed run already reached the terminal
                    // marker; there is nothing left to re-invoke.
                    return Ok(WalkOutcome {
                        report: RunReport {
                            run_id,
                            status: RunStatus::Completed,
                            failure_reason: None,
                            completed_nodes,
                            state,
                        },
                        update: cumulative,
                    });
                }
            }
        }
    }

    if !resumed {
        events.emit(RunEvent::RunStarted {
            run_id: run_id.clone(),
            graph: graph.name.clone(),
        });
    }

    let mut status = RunStatus::Completed;
    let mut failure_reason: Option<String> = None;
    let mut steps: u32 = 0;

    while current != END {
        if config.cancel.is_cancelled() {
            events.emit(RunEvent::RunCancelled {
                run_id: run_id.clone(),
                before_node: current.clone(),
            });
            status = RunStatus::Cancelled;
            break;
        }

        steps += 1;
        if steps > config.max_steps {
            let reason = format!(
                "maximum step count {} exceeded at node '{current}'",
                config.max_steps
            );
            let failure = S::failure_update(
                "engine",
                &reason,
                json!({ "timestamp": timestamp_now(), "node": current }),
            );
            cumulative = S::merge_updates(cumulative, failure.clone());
            state = state.apply(failure);
            status = RunStatus::Failed;
            failure_reason = Some(reason);
            break;
        }

        let handler = graph.nodes.get(&current).ok_or_else(|| {
            EngineError::Runtime(format!("traversal reached unknown node '{current}'"))
        })?;

        let step = execute_step(&run_id, &current, handler, &state, &events).await;
        cumulative = S::merge_updates(cumulative, step.update.clone());
        state = state.apply(step.update);
        completed_nodes.push(current.clone());

        events.emit(RunEvent::NodeCompleted {
            run_id: run_id.clone(),
            node: current.clone(),
            duration_ms: step.duration_ms,
            state: state.clone(),
        });

        let next = match graph.edges.get(&current) {
            None => END.to_string(),
            Some(EdgeSpec::Fixed(to)) => to.clone(),
            Some(EdgeSpec::Conditional { router, targets }) => {
                let label = router(&state);
                targets.get(&label).cloned().ok_or_else(|| {
                    EngineError::Runtime(format!(
                        "router after '{current}' returned undeclared label '{label}'"
                    ))
                })?
            }
        };

        if let Some(store) = config.checkpoints.as_ref() {
            let next_node = (next != END).then(|| next.clone());
            store
                .save(&Checkpoint::new(
                    run_id.clone(),
                    completed_nodes.clone(),
                    next_node,
                    state.clone(),
                ))
                .await?;
            events.emit(RunEvent::CheckpointSaved {
                run_id: run_id.clone(),
                node: current.clone(),
            });
        }

        current = next;
    }

    if status == RunStatus::Completed {
        events.emit(RunEvent::RunCompleted {
            run_id: run_id.clone(),
            graph: graph.name.clone(),
        });
    }

    Ok(WalkOutcome {
        report: RunReport {
            run_id,
            status,
            failure_reason,
            completed_nodes,
            state,
        },
        update: cumulative,
    })
}

/// Execution driver. One-shot `run` walks the plan to the terminal
/// marker and returns the final state; `stream` does the same on a
/// spawned task and hands back an event receiver yielding one
/// node-completed event (with the merged state) per node.
#[derive(Debug, Default)]
pub struct PipelineRunner;

impl PipelineRunner {
    pub async fn run<S: StateChannels>(
        &self,
        graph: &CompiledGraph<S>,
        initial: S,
        config: RunConfig<S>,
    ) -> Result<RunReport<S>, EngineError> {
        walk(graph, initial, config).await.map(|outcome| outcome.report)
    }

    pub fn stream<S: StateChannels>(
        &self,
        graph: Arc<CompiledGraph<S>>,
        initial: S,
        mut config: RunConfig<S>,
    ) -> (
        RunEventReceiver<S>,
        JoinHandle<Result<RunReport<S>, EngineError>>,
    ) {
        let (sender, receiver) = run_event_channel();
        config.events = config.events.sender(sender);
        let handle = tokio::spawn(async move {
            walk(graph.as_ref(), initial, config)
                .await
                .map(|outcome| outcome.report)
        });
        (receiver, handle)
    }
}

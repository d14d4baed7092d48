use crate::{EventSink, NodeHandler, RunEvent, StateChannels, timestamp_now};
use serde_json::json;
use std::sync::Arc;
use tokio::time::Instant;

/// Result of one wrapped step invocation.
pub struct StepRun<U> {
    pub update: U,
    pub duration_ms: u64,
    pub failed: bool,
}

/// Uniform wrapper around every node invocation: emits start/finish
/// events with durations and converts a failing step body into a
/// failure update instead of propagating the error to the driver. The
/// decision to halt on failure belongs to the routers reading the
/// error channel, not to the step that detected it.
pub async fn execute_step<S: StateChannels>(
    run_id: &str,
    node_name: &str,
    handler: &Arc<dyn NodeHandler<S>>,
    state: &S,
    events: &EventSink<S>,
) -> StepRun<S::Update> {
    events.emit(RunEvent::NodeStarted {
        run_id: run_id.to_string(),
        node: node_name.to_string(),
    });
    let started = Instant::now();

    match handler.run(state).await {
        Ok(mut update) => {
            S::mark_step(&mut update, node_name);
            StepRun {
                update,
                duration_ms: started.elapsed().as_millis() as u64,
                failed: false,
            }
        }
        Err(error) => {
            let message = error.to_string();
            let duration_ms = started.elapsed().as_millis() as u64;
            events.emit(RunEvent::NodeFailed {
                run_id: run_id.to_string(),
                node: node_name.to_string(),
                duration_ms,
                message: message.clone(),
            });
            let mut failure = S::failure_update(
                node_name,
                &message,
                json!({
                    "message": message,
                    "timestamp": timestamp_now(),
                    "duration_ms": duration_ms,
                }),
            );
            S::mark_step(&mut failure, node_name);
            StepRun {
                update: failure,
                duration_ms,
                failed: true,
            }
        }
    }
}

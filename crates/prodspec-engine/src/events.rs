use crate::StateChannels;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;

/// Per-run lifecycle events. `NodeCompleted` carries the merged state
/// after the node, which is what streaming consumers render.
#[derive(Clone, Debug)]
pub enum RunEvent<S: StateChannels> {
    RunStarted {
        run_id: String,
        graph: String,
    },
    RunResumed {
        run_id: String,
        graph: String,
        next_node: String,
    },
    NodeStarted {
        run_id: String,
        node: String,
    },
    NodeCompleted {
        run_id: String,
        node: String,
        duration_ms: u64,
        state: S,
    },
    NodeFailed {
        run_id: String,
        node: String,
        duration_ms: u64,
        message: String,
    },
    CheckpointSaved {
        run_id: String,
        node: String,
    },
    RunCancelled {
        run_id: String,
        before_node: String,
    },
    RunCompleted {
        run_id: String,
        graph: String,
    },
}

impl<S: StateChannels> RunEvent<S> {
    pub fn node_name(&self) -> Option<&str> {
        match self {
            Self::NodeStarted { node, .. }
            | Self::NodeCompleted { node, .. }
            | Self::NodeFailed { node, .. }
            | Self::CheckpointSaved { node, .. } => Some(node),
            _ => None,
        }
    }
}

pub trait RunEventObserver<S: StateChannels>: Send + Sync {
    fn on_event(&self, event: &RunEvent<S>);
}

impl<S: StateChannels, F> RunEventObserver<S> for F
where
    F: Fn(&RunEvent<S>) + Send + Sync,
{
    fn on_event(&self, event: &RunEvent<S>) {
        self(event);
    }
}

pub type SharedRunEventObserver<S> = Arc<dyn RunEventObserver<S>>;
pub type RunEventSender<S> = mpsc::UnboundedSender<RunEvent<S>>;
pub type RunEventReceiver<S> = mpsc::UnboundedReceiver<RunEvent<S>>;

/// Fan-out for run events: an optional observer callback plus an
/// optional channel sender, both receiving every event.
#[derive(Clone)]
pub struct EventSink<S: StateChannels> {
    observer: Option<SharedRunEventObserver<S>>,
    sender: Option<RunEventSender<S>>,
}

impl<S: StateChannels> Default for EventSink<S> {
    fn default() -> Self {
        Self {
            observer: None,
            sender: None,
        }
    }
}

impl<S: StateChannels> EventSink<S> {
    pub fn with_observer(observer: SharedRunEventObserver<S>) -> Self {
        Self {
            observer: Some(observer),
            sender: None,
        }
    }

    pub fn observer(mut self, observer: SharedRunEventObserver<S>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn sender(mut self, sender: RunEventSender<S>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn emit(&self, event: RunEvent<S>) {
        if let Some(observer) = self.observer.as_ref() {
            observer.on_event(&event);
        }
        if let Some(sender) = self.sender.as_ref() {
            let _ = sender.send(event);
        }
    }
}

pub fn run_event_channel<S: StateChannels>() -> (RunEventSender<S>, RunEventReceiver<S>) {
    mpsc::unbounded_channel()
}

pub fn timestamp_now() -> String {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!(
        "{}.{:03}Z",
        since_epoch.as_secs(),
        since_epoch.subsec_millis()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Blank;

    impl StateChannels for Blank {
        type Update = ();

        fn apply(self, _update: ()) -> Self {
            self
        }

        fn merge_updates(_first: (), _second: ()) {}

        fn failure_update(_step: &str, _message: &str, _detail: serde_json::Value) {}

        fn mark_step(_update: &mut (), _step: &str) {}
    }

    #[test]
    fn event_sink_observer_and_sender_expected_both_receive() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let observer_seen = Arc::clone(&seen);
        let observer: SharedRunEventObserver<Blank> =
            Arc::new(move |event: &RunEvent<Blank>| {
                if let RunEvent::NodeStarted { node, .. } = event {
                    observer_seen
                        .lock()
                        .expect("observer mutex should lock")
                        .push(node.clone());
                }
            });
        let (tx, mut rx) = run_event_channel();
        let sink = EventSink::with_observer(observer).sender(tx);

        sink.emit(RunEvent::NodeStarted {
            run_id: "run-1".to_string(),
            node: "plan".to_string(),
        });

        let streamed = rx.try_recv().expect("channel should receive one event");
        assert_eq!(streamed.node_name(), Some("plan"));
        assert_eq!(
            seen.lock().expect("observer mutex should lock").as_slice(),
            &["plan".to_string()]
        );
    }
}

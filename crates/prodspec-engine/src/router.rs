use crate::StateChannels;
use std::sync::Arc;

/// A pure decision function: inspects the merged state after a node and
/// returns a label that the conditional edge table maps to the next
/// node. No side effects, so routers are unit-testable against
/// constructed states and always deterministic for a fixed state.
pub type Router<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

pub fn router<S, F>(f: F) -> Router<S>
where
    S: StateChannels,
    F: Fn(&S) -> String + Send + Sync + 'static,
{
    Arc::new(f)
}

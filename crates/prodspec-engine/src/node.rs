use crate::{EngineError, StateChannels};
use async_trait::async_trait;

/// A unit of pipeline work: reads a state snapshot, returns a partial
/// update. Never mutates the state in place, which is what makes replay
/// and resumption well-defined.
#[async_trait]
pub trait NodeHandler<S: StateChannels>: Send + Sync {
    async fn run(&self, state: &S) -> Result<S::Update, EngineError>;
}

/// Handler that returns an empty update. Useful as a structural marker
/// node and in tests.
#[derive(Debug, Default)]
pub struct NoopNode;

#[async_trait]
impl<S: StateChannels> NodeHandler<S> for NoopNode {
    async fn run(&self, _state: &S) -> Result<S::Update, EngineError> {
        Ok(S::Update::default())
    }
}

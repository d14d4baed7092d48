use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Build-time graph validation failure. The only error class that is
    /// meant to reach the developer synchronously; everything at runtime
    /// is recovered into the state's error channel instead.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),
    #[error("runtime error: {0}")]
    Runtime(String),
    #[error("checkpoint error: {0}")]
    Checkpoint(String),
}

impl EngineError {
    pub fn runtime(message: impl std::fmt::Display) -> Self {
        Self::Runtime(message.to_string())
    }

    pub fn checkpoint(message: impl std::fmt::Display) -> Self {
        Self::Checkpoint(message.to_string())
    }
}

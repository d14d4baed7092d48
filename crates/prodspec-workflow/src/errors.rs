use prodspec_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A prompt override named a key that is neither a generation step
    /// nor a document kind. Rejected at state construction so typos do
    /// not silently disable an override mid-run.
    #[error("unknown prompt key '{0}'")]
    UnknownPromptKey(String),
    #[error("persistence failed: {0}")]
    Persistence(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl WorkflowError {
    pub fn persistence(message: impl std::fmt::Display) -> Self {
        Self::Persistence(message.to_string())
    }
}

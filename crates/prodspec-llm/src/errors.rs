use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ValidationError {
    #[error("response is not valid JSON: {0}")]
    Parse(String),
    #[error("response does not match the expected shape: {0}")]
    Shape(String),
}

#[derive(Debug, Error)]
pub enum LlmError {
    /// The external call itself failed (timeout, transport, refusal).
    #[error("generation request failed: {0}")]
    Generation(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// All attempts exhausted; names the step so the failure is
    /// attributable when it surfaces in the workflow's error channel.
    #[error("step '{step}' failed after {attempts} attempt(s): {last_error}")]
    RetriesExhausted {
        step: String,
        attempts: u32,
        last_error: String,
    },
}

use crate::LlmError;
use async_trait::async_trait;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerateOptions {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// The replaceable text-generation capability. The engine treats this
/// as an opaque, possibly slow, possibly failing call; which model sits
/// behind it and over what protocol is a caller concern.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, options: &GenerateOptions)
    -> Result<String, LlmError>;
}

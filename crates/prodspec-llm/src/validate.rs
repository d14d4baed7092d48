use crate::ValidationError;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Structured-data validation behind a narrow contract: raw generated
/// text in, typed value or a describable failure out. Any validation
/// approach (hand-written parsers, generated validators) satisfies it.
pub trait Validator<T>: Send + Sync {
    fn validate(&self, raw: &str) -> Result<T, ValidationError>;

    /// Machine-readable description of the expected structure, appended
    /// to the prompt when a retry needs to repair the model's output.
    fn shape(&self) -> &str;
}

/// JSON-backed validator: parse the text as JSON, then deserialize into
/// `T`. The shape description is the JSON Schema derived from `T`.
pub struct JsonValidator<T> {
    shape: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned + JsonSchema> JsonValidator<T> {
    pub fn new() -> Self {
        let schema = schemars::schema_for!(T);
        Self {
            shape: serde_json::to_string_pretty(&schema).unwrap_or_default(),
            _marker: PhantomData,
        }
    }
}

impl<T: DeserializeOwned + JsonSchema> Default for JsonValidator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned + JsonSchema> Validator<T> for JsonValidator<T> {
    fn validate(&self, raw: &str) -> Result<T, ValidationError> {
        let value: serde_json::Value = serde_json::from_str(strip_code_fences(raw))
            .map_err(|error| ValidationError::Parse(error.to_string()))?;
        serde_json::from_value(value).map_err(|error| ValidationError::Shape(error.to_string()))
    }

    fn shape(&self) -> &str {
        &self.shape
    }
}

/// Models frequently wrap JSON in a markdown code fence; tolerate that
/// before handing the text to the parser.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

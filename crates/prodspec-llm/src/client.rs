use crate::{GenerateOptions, LlmError, TextGenerator, Validator};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct CallOptions {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub max_retries: u32,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            temperature: None,
            max_tokens: None,
            max_retries: 3,
        }
    }
}

/// Retryable, schema-checked front door to the text generator, so that
/// pipeline steps can assume well-typed input. On a validation failure
/// the expected shape is appended to the prompt before the next
/// attempt; transport failures retry with the prompt untouched. Backoff
/// is `2^attempt` seconds between attempts.
pub struct SchemaClient {
    generator: Arc<dyn TextGenerator>,
}

impl SchemaClient {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> Arc<dyn TextGenerator> {
        Arc::clone(&self.generator)
    }

    pub async fn call_with_schema<T>(
        &self,
        step: &str,
        prompt: &str,
        validator: &dyn Validator<T>,
        options: &CallOptions,
    ) -> Result<T, LlmError> {
        let attempts = options.max_retries.max(1);
        let generate_options = GenerateOptions {
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let mut prompt = prompt.to_string();
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.generator.generate(&prompt, &generate_options).await {
                Ok(raw) => match validator.validate(&raw) {
                    Ok(value) => return Ok(value),
                    Err(error) => {
                        if attempt < attempts {
                            prompt = format!(
                                "{prompt}\n\nIMPORTANT: the response must be JSON matching this exact structure:\n{}",
                                validator.shape()
                            );
                        }
                        last_error = error.to_string();
                    }
                },
                Err(error) => last_error = error.to_string(),
            }

            if attempt < attempts {
                tokio::time::sleep(Duration::from_secs(1u64 << attempt)).await;
            }
        }

        Err(LlmError::RetriesExhausted {
            step: step.to_string(),
            attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JsonValidator, ValidationError};
    use async_trait::async_trait;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use std::sync::Mutex;

    #[derive(Debug, Deserialize, JsonSchema, PartialEq)]
    struct Verdict {
        ok: bool,
    }

    struct Scripted {
        responses: Mutex<Vec<Result<String, LlmError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<String, LlmError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().expect("prompts mutex should lock").clone()
        }
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(
            &self,
            prompt: &str,
            _options: &GenerateOptions,
        ) -> Result<String, LlmError> {
            self.prompts
                .lock()
                .expect("prompts mutex should lock")
                .push(prompt.to_string());
            let mut responses = self.responses.lock().expect("responses mutex should lock");
            if responses.is_empty() {
                return Err(LlmError::Generation("script exhausted".to_string()));
            }
            responses.remove(0)
        }
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn call_first_unparsable_second_valid_expected_repaired_prompt() {
        let generator = Arc::new(Scripted::new(vec![
            Ok("not json at all".to_string()),
            Ok(r#"{"ok": true}"#.to_string()),
        ]));
        let client = SchemaClient::new(generator.clone());
        let validator = JsonValidator::<Verdict>::new();

        let verdict = client
            .call_with_schema("validate", "Is this fine?", &validator, &CallOptions::default())
            .await
            .expect("second attempt should succeed");

        assert!(verdict.ok);
        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(!prompts[0].contains("exact structure"));
        assert!(prompts[1].contains("exact structure"));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn call_transport_failure_expected_prompt_not_repaired() {
        let generator = Arc::new(Scripted::new(vec![
            Err(LlmError::Generation("connection reset".to_string())),
            Ok(r#"{"ok": false}"#.to_string()),
        ]));
        let client = SchemaClient::new(generator.clone());
        let validator = JsonValidator::<Verdict>::new();

        let verdict = client
            .call_with_schema("validate", "Is this fine?", &validator, &CallOptions::default())
            .await
            .expect("second attempt should succeed");

        assert!(!verdict.ok);
        let prompts = generator.prompts();
        assert_eq!(prompts[0], prompts[1]);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn call_all_attempts_fail_expected_error_names_step() {
        let generator = Arc::new(Scripted::new(vec![
            Ok("nope".to_string()),
            Ok("still nope".to_string()),
            Ok("never".to_string()),
        ]));
        let client = SchemaClient::new(generator);
        let validator = JsonValidator::<Verdict>::new();

        let error = client
            .call_with_schema(
                "generate_personas",
                "Make personas",
                &validator,
                &CallOptions::default(),
            )
            .await
            .expect_err("exhaustion expected");

        match error {
            LlmError::RetriesExhausted {
                step,
                attempts,
                last_error,
            } => {
                assert_eq!(step, "generate_personas");
                assert_eq!(attempts, 3);
                assert!(last_error.contains("not valid JSON"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validation_error_display_expected_readable() {
        let error = ValidationError::Shape("missing field `ok`".to_string());
        assert_eq!(
            error.to_string(),
            "response does not match the expected shape: missing field `ok`"
        );
    }
}

//! Grounded response generation.
//!
//! The orchestrator owns the retry/timeout policy around the generation
//! service: bounded attempts with exponential backoff, and a fixed user-safe
//! fallback once attempts are exhausted. Callers always get a displayable
//! response back, never an error.

mod openai;

pub use openai::OpenAIGenerator;

use crate::config::{GenerationSettings, Prompts};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Fallback text shown when the generation service stays unreachable.
const FALLBACK_MESSAGE: &str =
    "I couldn't reach the recommendation service just now. Please try again in a moment.";

/// Trait for text generation backends.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Complete a system + user prompt pair into free text.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Identifier of the underlying model, for provenance.
    fn model(&self) -> &str;
}

/// Outcome of a generation run. Always displayable.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    /// Generated text, or the fallback message on failure.
    pub text: String,
    /// Model that produced (or would have produced) the text.
    pub model: String,
    /// False when all attempts were exhausted and the fallback is shown.
    pub succeeded: bool,
    /// Number of attempts made.
    pub attempts: u32,
}

/// Drives the generation service with bounded retries and per-attempt deadlines.
pub struct GenerationOrchestrator {
    generator: Arc<dyn Generator>,
    prompts: Prompts,
    timeout: Duration,
    max_retries: u32,
    backoff_base: Duration,
}

impl GenerationOrchestrator {
    /// Create an orchestrator from settings and a generator backend.
    pub fn new(generator: Arc<dyn Generator>, prompts: Prompts, settings: &GenerationSettings) -> Self {
        Self {
            generator,
            prompts,
            timeout: Duration::from_secs(settings.timeout_seconds),
            max_retries: settings.max_retries,
            backoff_base: Duration::from_millis(settings.backoff_ms),
        }
    }

    /// Generate a recommendation for the query, grounded in the context block.
    ///
    /// Never fails: on retry exhaustion the response carries the fallback
    /// message with `succeeded == false`.
    #[instrument(skip(self, context), fields(query = %query))]
    pub async fn generate(&self, query: &str, context: &str) -> GenerationResponse {
        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.to_string());
        vars.insert("context".to_string(), context.to_string());

        let system = self
            .prompts
            .render_with_custom(&self.prompts.recommend.system, &vars);
        let user = self
            .prompts
            .render_with_custom(&self.prompts.recommend.user, &vars);

        let total_attempts = self.max_retries + 1;
        let mut delay = self.backoff_base;

        for attempt in 1..=total_attempts {
            match tokio::time::timeout(self.timeout, self.generator.complete(&system, &user)).await
            {
                Ok(Ok(text)) if !text.trim().is_empty() => {
                    debug!("Generation succeeded on attempt {}", attempt);
                    return GenerationResponse {
                        text,
                        model: self.generator.model().to_string(),
                        succeeded: true,
                        attempts: attempt,
                    };
                }
                Ok(Ok(_)) => {
                    warn!("Attempt {}/{}: empty response", attempt, total_attempts);
                }
                Ok(Err(e)) => {
                    warn!("Attempt {}/{}: {}", attempt, total_attempts, e);
                }
                Err(_) => {
                    warn!(
                        "Attempt {}/{}: timed out after {:?}",
                        attempt, total_attempts, self.timeout
                    );
                }
            }

            // All waiting happens here, outside any shared state.
            if attempt < total_attempts {
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }

        warn!("Generation attempts exhausted, returning fallback");
        GenerationResponse {
            text: FALLBACK_MESSAGE.to_string(),
            model: self.generator.model().to_string(),
            succeeded: false,
            attempts: total_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CineMindError;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FailingGenerator {
        calls: AtomicU32,
        succeed_on: Option<u32>,
    }

    #[async_trait]
    impl Generator for FailingGenerator {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            match self.succeed_on {
                Some(n) if call >= n => Ok(format!("answer on call {}", call)),
                _ => Err(CineMindError::Generation("simulated outage".to_string())),
            }
        }

        fn model(&self) -> &str {
            "stub-model"
        }
    }

    struct HangingGenerator;

    #[async_trait]
    impl Generator for HangingGenerator {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            futures::future::pending().await
        }

        fn model(&self) -> &str {
            "stub-model"
        }
    }

    fn settings() -> GenerationSettings {
        GenerationSettings {
            timeout_seconds: 1,
            max_retries: 2,
            backoff_ms: 1,
            ..GenerationSettings::default()
        }
    }

    #[tokio::test]
    async fn test_exhausted_retries_yield_fallback() {
        let generator = Arc::new(FailingGenerator {
            calls: AtomicU32::new(0),
            succeed_on: None,
        });
        let orchestrator =
            GenerationOrchestrator::new(generator.clone(), Prompts::default(), &settings());

        let response = orchestrator.generate("some query", "context").await;
        assert!(!response.succeeded);
        assert!(!response.text.is_empty());
        assert_eq!(response.attempts, 3);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let generator = Arc::new(FailingGenerator {
            calls: AtomicU32::new(0),
            succeed_on: Some(2),
        });
        let orchestrator = GenerationOrchestrator::new(generator, Prompts::default(), &settings());

        let response = orchestrator.generate("some query", "context").await;
        assert!(response.succeeded);
        assert_eq!(response.attempts, 2);
        assert_eq!(response.model, "stub-model");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_service_times_out_to_fallback() {
        let orchestrator =
            GenerationOrchestrator::new(Arc::new(HangingGenerator), Prompts::default(), &settings());

        let response = orchestrator.generate("some query", "context").await;
        assert!(!response.succeeded);
        assert_eq!(response.attempts, 3);
    }
}

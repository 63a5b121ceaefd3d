//! Single-tester playtest execution

use crate::{
    client::ModelClient,
    config::{ModelTier, OrchestratorConfig},
    error::ModelError,
    monitoring,
    parser::parse_response,
    prompt::build_prompt,
    types::{ContentUnderTest, TestResult, TesterConfig},
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Drives one tester through one piece of content.
///
/// Every outcome becomes a [`TestResult`]: client errors and deadline expiry
/// are recorded as failed results, never propagated. No retries.
#[derive(Clone)]
pub struct PlaytestRunner {
    client: Arc<dyn ModelClient>,
    model: ModelTier,
    temperature: f32,
    request_timeout: Duration,
}

impl PlaytestRunner {
    pub fn new(client: Arc<dyn ModelClient>, config: &OrchestratorConfig) -> Self {
        Self {
            client,
            model: config.model,
            temperature: config.temperature,
            request_timeout: config.request_timeout(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Run `tester` against `content`
    pub async fn run(&self, tester: &TesterConfig, content: &ContentUnderTest) -> TestResult {
        let started = Instant::now();
        let prompt = build_prompt(tester, content);

        debug!(
            tester_id = %tester.id,
            model = %self.model,
            prompt_len = prompt.len(),
            "Requesting playtest feedback"
        );

        let outcome = timeout(
            self.request_timeout,
            self.client.generate(&prompt, self.model, self.temperature),
        )
        .await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(text)) => {
                let parsed = parse_response(&text);
                debug!(
                    tester_id = %tester.id,
                    duration_ms,
                    bugs = parsed.bugs.len(),
                    recommendation = %parsed.recommendation,
                    "Parsed tester response"
                );
                TestResult::from_response(tester, parsed, duration_ms)
            }
            Ok(Err(e)) => {
                if e.is_timeout() {
                    monitoring::record_timeout();
                }
                warn!(tester_id = %tester.id, error = %e, "Model call failed");
                TestResult::failure(tester, e.to_string(), duration_ms)
            }
            Err(_) => {
                let e = ModelError::Timeout {
                    timeout_ms: self.request_timeout.as_millis() as u64,
                };
                monitoring::record_timeout();
                warn!(tester_id = %tester.id, duration_ms, "Model call exceeded deadline");
                TestResult::failure(tester, e.to_string(), duration_ms)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::ScriptedModelClient,
        types::{Archetype, KnowledgeLevel, Pacing},
    };

    fn tester() -> TesterConfig {
        TesterConfig::new("sr-1", "Dash", Archetype::Speedrunner, KnowledgeLevel::Expert)
    }

    fn content() -> ContentUnderTest {
        ContentUnderTest::new("quest", "Sunken Vault")
    }

    #[tokio::test]
    async fn test_success_is_parsed() {
        let client = ScriptedModelClient::new("Completed: Yes\nDifficulty: 3/10\nPacing: too_fast");
        let runner = PlaytestRunner::new(Arc::new(client), &OrchestratorConfig::default());

        let result = runner.run(&tester(), &content()).await;

        assert!(result.success);
        assert!(result.error.is_none());
        let parsed = result.response().unwrap();
        assert!(parsed.completed);
        assert_eq!(parsed.difficulty, 3);
        assert_eq!(parsed.pacing, Pacing::TooFast);
        assert_eq!(result.tester_id, "sr-1");
    }

    #[tokio::test]
    async fn test_client_error_is_captured() {
        let client = ScriptedModelClient::new("unused").fail_on("Dash", ModelError::api("AI API Error"));
        let runner = PlaytestRunner::new(Arc::new(client), &OrchestratorConfig::default());

        let result = runner.run(&tester(), &content()).await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("AI API Error"));
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_a_timeout_failure() {
        let client = ScriptedModelClient::new("Completed: Yes").with_default_delay(Duration::from_millis(100));
        let config = OrchestratorConfig::default().with_request_timeout_ms(1);
        let runner = PlaytestRunner::new(Arc::new(client), &config);

        let result = runner.run(&tester(), &content()).await;

        assert!(!result.success);
        assert!(result.error.as_ref().unwrap().contains("timeout"));
        assert!(result.response().is_none());
        assert!(!result.finished());
    }
}

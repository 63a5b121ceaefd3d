//! Language-model client boundary
//!
//! The orchestrator depends on a single asynchronous operation,
//! [`ModelClient::generate`]. Model selection, credentials and routing live
//! behind the trait, outside this crate.

use crate::{config::ModelTier, error::ModelError};
use async_trait::async_trait;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

/// Text generation capability injected into the orchestrator
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate a completion for `prompt`
    async fn generate(
        &self,
        prompt: &str,
        model: ModelTier,
        temperature: f32,
    ) -> Result<String, ModelError>;
}

/// A scripted reply
#[derive(Debug, Clone)]
struct ScriptedReply {
    delay: Option<Duration>,
    outcome: Result<String, ModelError>,
}

/// Deterministic in-memory client for demos and tests.
///
/// Replies are chosen by the first rule whose needle occurs in the prompt
/// (tester names and IDs are embedded in every prompt), falling back to the
/// default reply.
#[derive(Debug, Clone)]
pub struct ScriptedModelClient {
    default: ScriptedReply,
    rules: Vec<(String, ScriptedReply)>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedModelClient {
    /// Reply to every prompt with `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default: ScriptedReply {
                delay: None,
                outcome: Ok(response.into()),
            },
            rules: Vec::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Reply with `response` to prompts containing `needle`
    pub fn respond_to(mut self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.rules.push((
            needle.into(),
            ScriptedReply {
                delay: None,
                outcome: Ok(response.into()),
            },
        ));
        self
    }

    /// Fail prompts containing `needle` with `error`
    pub fn fail_on(mut self, needle: impl Into<String>, error: ModelError) -> Self {
        self.rules.push((
            needle.into(),
            ScriptedReply {
                delay: None,
                outcome: Err(error),
            },
        ));
        self
    }

    /// Delay the reply to prompts containing `needle`
    pub fn delay_on(mut self, needle: impl Into<String>, delay: Duration) -> Self {
        let outcome = self.default.outcome.clone();
        self.rules.push((
            needle.into(),
            ScriptedReply {
                delay: Some(delay),
                outcome,
            },
        ));
        self
    }

    /// Delay every reply that no rule matches
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default.delay = Some(delay);
        self
    }

    /// Number of `generate` calls served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn reply_for(&self, prompt: &str) -> &ScriptedReply {
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply)
            .unwrap_or(&self.default)
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    async fn generate(
        &self,
        prompt: &str,
        _model: ModelTier,
        _temperature: f32,
    ) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let reply = self.reply_for(prompt).clone();
        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        reply.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_rules_take_precedence() {
        let client = ScriptedModelClient::new("default")
            .respond_to("alpha", "for alpha")
            .fail_on("beta", ModelError::api("AI API Error"));

        let a = client.generate("tester alpha", ModelTier::Fast, 0.5).await;
        let b = client.generate("tester beta", ModelTier::Fast, 0.5).await;
        let c = client.generate("tester gamma", ModelTier::Fast, 0.5).await;

        assert_eq!(a.unwrap(), "for alpha");
        assert_eq!(b.unwrap_err(), ModelError::api("AI API Error"));
        assert_eq!(c.unwrap(), "default");
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_usable_as_trait_object() {
        let client: Arc<dyn ModelClient> = Arc::new(ScriptedModelClient::new("ok"));
        let text = client.generate("p", ModelTier::Balanced, 0.7).await.unwrap();
        assert_eq!(text, "ok");
    }
}

//! Shared helpers for playtest-swarm integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use playtest_swarm::prelude::*;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// A well-formed tester response
pub const TEMPLATE_RESPONSE: &str = "\
## Playthrough
Took the quest from the innkeeper and followed the river north.

## Completion Status
Completed: Yes

## Difficulty Rating
Difficulty: 5/10

## Engagement Rating
Engagement: 7/10

## Pacing Assessment
Pacing: just_right

## Bugs Found
- [MINOR] Torch clips through the chapel wall
- [MAJOR] Quest marker stays after turning in the bell

## Confusion Points
- Unclear which lever opens the crypt

## Overall Feedback
Solid quest, needs clearer signposting.

## Recommendation
Recommendation: pass_with_changes
";

/// Initialize test logging
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("playtest_swarm=debug")),
        )
        .with_test_writer()
        .try_init();
}

pub fn quest() -> ContentUnderTest {
    ContentUnderTest::new("quest", "The Drowned Bell")
        .with_description("Recover a bell from a flooded chapel")
        .with_payload(serde_json::json!({ "steps": ["talk to innkeeper", "dive", "ring the bell"] }))
}

pub fn expert_completionist() -> TesterConfig {
    TesterConfig::new("completionist-1", "Ada", Archetype::Completionist, KnowledgeLevel::Expert)
}

pub fn beginner_casual() -> TesterConfig {
    TesterConfig::new("casual-1", "Sam", Archetype::Casual, KnowledgeLevel::Beginner)
}

/// Numbered testers with distinct names
pub fn numbered_testers(count: usize) -> Vec<TesterConfig> {
    (0..count)
        .map(|i| {
            let archetype = Archetype::ALL[i % Archetype::ALL.len()];
            TesterConfig::new(
                format!("tester-{i:02}"),
                format!("Tester{i:02}"),
                archetype,
                KnowledgeLevel::Intermediate,
            )
        })
        .collect()
}

pub fn orchestrator(config: OrchestratorConfig, client: impl ModelClient + 'static) -> PlaytestOrchestrator {
    PlaytestOrchestrator::new(config, Arc::new(client)).unwrap()
}

/// Client that panics for prompts containing `needle`
pub struct PanickingClient {
    pub needle: String,
    pub response: String,
}

#[async_trait]
impl ModelClient for PanickingClient {
    async fn generate(&self, prompt: &str, _model: ModelTier, _temperature: f32) -> Result<String, ModelError> {
        if prompt.contains(&self.needle) {
            panic!("model client blew up");
        }
        Ok(self.response.clone())
    }
}

/// Client that tracks how many calls are in flight and the order they started
#[derive(Clone, Default)]
pub struct TrackingClient {
    pub delay: Duration,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    started: Arc<Mutex<Vec<String>>>,
}

impl TrackingClient {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for TrackingClient {
    async fn generate(&self, prompt: &str, _model: ModelTier, _temperature: f32) -> Result<String, ModelError> {
        let name = prompt
            .split_whitespace()
            .nth(2)
            .unwrap_or_default()
            .to_string();
        self.started.lock().unwrap().push(name);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(TEMPLATE_RESPONSE.to_string())
    }
}

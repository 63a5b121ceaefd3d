//! Swarm playtest coordination

use crate::{
    aggregation::MetricsAggregator,
    client::ModelClient,
    config::OrchestratorConfig,
    consensus::ConsensusBuilder,
    error::{PlaytestError, PlaytestResult},
    monitoring,
    recommendations::RecommendationEngine,
    registry::{SwarmStats, TesterRegistry},
    report::{ReportAssembler, RunContext, SwarmRunResult},
    runner::PlaytestRunner,
    types::{ContentUnderTest, TestResult, TesterConfig},
};
use chrono::Utc;
use futures::future::join_all;
use std::{sync::Arc, time::Instant};
use tokio::{sync::RwLock, task::JoinError};
use tracing::{debug, error, info};
use uuid::Uuid;

/// Runs a roster of testers against content and assembles the verdict.
///
/// The roster lives behind a `RwLock` that is written only by registration,
/// [`reset`](Self::reset) and the single stats pass at the end of a run.
/// Model calls never hold the lock.
pub struct PlaytestOrchestrator {
    config: OrchestratorConfig,
    runner: PlaytestRunner,
    registry: Arc<RwLock<TesterRegistry>>,
}

impl PlaytestOrchestrator {
    /// Create an orchestrator with a validated configuration
    pub fn new(config: OrchestratorConfig, client: Arc<dyn ModelClient>) -> PlaytestResult<Self> {
        config.validate()?;
        monitoring::describe_metrics();

        info!(
            parallel = config.parallel_tests,
            model = %config.model,
            temperature = config.temperature,
            request_timeout_ms = config.request_timeout_ms,
            "Creating playtest orchestrator"
        );

        Ok(Self {
            runner: PlaytestRunner::new(client, &config),
            config,
            registry: Arc::new(RwLock::new(TesterRegistry::new())),
        })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Add a tester, or replace the one with the same ID in place
    pub async fn register_tester(&self, tester: TesterConfig) {
        let mut registry = self.registry.write().await;
        registry.register(tester);
        monitoring::record_testers_registered(registry.len());
    }

    pub async fn register_testers<I>(&self, testers: I)
    where
        I: IntoIterator<Item = TesterConfig>,
    {
        let mut registry = self.registry.write().await;
        for tester in testers {
            registry.register(tester);
        }
        monitoring::record_testers_registered(registry.len());
    }

    pub async fn tester_count(&self) -> usize {
        self.registry.read().await.len()
    }

    /// Snapshot of per-tester and swarm-wide statistics
    pub async fn stats(&self) -> SwarmStats {
        self.registry.read().await.stats()
    }

    /// Zero every statistic, keeping the roster
    pub async fn reset(&self) {
        self.registry.write().await.reset();
    }

    /// Run every registered tester against `content`.
    ///
    /// Individual tester failures, timeouts and panics become failed results;
    /// the only error is an empty roster, detected before any model call.
    pub async fn run_swarm_playtest(&self, content: &ContentUnderTest) -> PlaytestResult<SwarmRunResult> {
        let testers = {
            let registry = self.registry.read().await;
            if registry.is_empty() {
                return Err(PlaytestError::NoTestersRegistered);
            }
            registry.configs()
        };

        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let timestamp = Utc::now();
        info!(
            %run_id,
            content_type = %content.content_type,
            content = %content.name,
            testers = testers.len(),
            parallel = self.config.parallel_tests,
            "Starting swarm playtest"
        );

        let content = Arc::new(content.clone());
        let results = if self.config.parallel_tests {
            self.run_parallel(&testers, &content).await
        } else {
            self.run_sequential(&testers, &content).await
        };

        self.registry.write().await.apply_results(&results);

        let metrics = MetricsAggregator::aggregate(&results);
        let consensus = ConsensusBuilder::build(&results, &metrics);
        let recommendations = RecommendationEngine::generate(&metrics);

        let elapsed = started.elapsed();
        let context = RunContext {
            run_id,
            parallel: self.config.parallel_tests,
            model: self.config.model,
            duration_ms: elapsed.as_millis() as u64,
            timestamp,
        };
        let run = ReportAssembler::assemble(&content, context, results, metrics, consensus, recommendations);

        monitoring::record_run(&run, elapsed);
        info!(
            %run_id,
            elapsed_ms = context.duration_ms,
            successful = run.aggregated_metrics.successful_tests,
            failed = run.aggregated_metrics.failed_tests,
            consensus = %run.consensus.recommendation,
            confidence = run.consensus.confidence,
            grade = %run.report.grade,
            grade_score = run.report.grade_score,
            "Swarm playtest finished"
        );

        Ok(run)
    }

    /// Start every tester at once; results come back in roster order
    async fn run_parallel(&self, testers: &[TesterConfig], content: &Arc<ContentUnderTest>) -> Vec<TestResult> {
        let started = Instant::now();
        let handles: Vec<_> = testers
            .iter()
            .map(|tester| self.spawn_tester(tester.clone(), Arc::clone(content)))
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .zip(testers)
            .map(|(joined, tester)| Self::collect(joined, tester, started))
            .collect()
    }

    async fn run_sequential(&self, testers: &[TesterConfig], content: &Arc<ContentUnderTest>) -> Vec<TestResult> {
        let mut results = Vec::with_capacity(testers.len());
        for tester in testers {
            let started = Instant::now();
            let joined = self.spawn_tester(tester.clone(), Arc::clone(content)).await;
            results.push(Self::collect(joined, tester, started));
        }
        results
    }

    fn spawn_tester(
        &self,
        tester: TesterConfig,
        content: Arc<ContentUnderTest>,
    ) -> tokio::task::JoinHandle<TestResult> {
        let runner = self.runner.clone();
        debug!(tester_id = %tester.id, "Spawning tester");
        tokio::spawn(async move { runner.run(&tester, &content).await })
    }

    /// A tester task that panicked or was cancelled still yields a result
    fn collect(joined: Result<TestResult, JoinError>, tester: &TesterConfig, started: Instant) -> TestResult {
        match joined {
            Ok(result) => result,
            Err(e) => {
                error!(tester_id = %tester.id, error = %e, "Tester task aborted");
                let duration_ms = started.elapsed().as_millis() as u64;
                TestResult::failure(tester, format!("tester task aborted: {e}"), duration_ms)
            }
        }
    }
}

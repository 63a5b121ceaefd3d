//! # Playtest Swarm
//!
//! Runs a roster of LLM-backed virtual playtesters against a piece of game
//! content and turns their free-form feedback into a single verdict.
//!
//! ## Key Features
//!
//! - **Persona-driven testers**: archetype, knowledge level, personality and expectations
//! - **Failure isolation**: errors, timeouts and panics become failed results, never lost
//! - **Tolerant parsing**: semi-structured responses degrade to defaults instead of erroring
//! - **Aggregation**: completion, difficulty, engagement, pacing and merged bug reports
//! - **Consensus**: majority vote with conservative tie-breaking and a confidence score
//! - **Reporting**: prioritized action items, a letter grade and a release gate
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │           PlaytestOrchestrator            │
//! ├───────────────────────────────────────────┤
//! │  TesterRegistry  │  PlaytestRunner × N    │
//! │                  │  (prompt → model →     │
//! │                  │   parse_response)      │
//! ├───────────────────────────────────────────┤
//! │  MetricsAggregator  │  ConsensusBuilder   │
//! ├───────────────────────────────────────────┤
//! │  RecommendationEngine → ReportAssembler   │
//! └───────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use playtest_swarm::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn demo(client: Arc<dyn ModelClient>) -> PlaytestResult<()> {
//! let orchestrator = PlaytestOrchestrator::new(OrchestratorConfig::default(), client)?;
//! orchestrator.register_testers(presets::default_roster()).await;
//!
//! let quest = ContentUnderTest::new("quest", "The Drowned Bell");
//! let run = orchestrator.run_swarm_playtest(&quest).await?;
//! println!("{} ({}): {}", run.report.grade, run.report.grade_score, run.consensus.summary);
//! # Ok(())
//! # }
//! ```

pub mod aggregation;
pub mod client;
pub mod config;
pub mod consensus;
pub mod coordinator;
pub mod error;
pub mod monitoring;
pub mod parser;
pub mod presets;
pub mod prompt;
pub mod recommendations;
pub mod registry;
pub mod report;
pub mod runner;
pub mod types;

pub use aggregation::{AggregatedMetrics, BugReport, GroupAverage, MetricsAggregator, PacingDistribution};
pub use client::{ModelClient, ScriptedModelClient};
pub use config::{ModelTier, OrchestratorConfig};
pub use consensus::{Agreement, Consensus, ConsensusBuilder};
pub use coordinator::PlaytestOrchestrator;
pub use error::{ModelError, PlaytestError, PlaytestResult};
pub use parser::{parse_response, ParsedResponse, Section};
pub use prompt::build_prompt;
pub use recommendations::{ActionableRecommendation, Category, Priority, RecommendationEngine};
pub use registry::{SwarmStats, TesterBreakdown, TesterRegistry};
pub use report::{Grade, ReportAssembler, SwarmReport, SwarmRunResult, TestingDetails};
pub use runner::PlaytestRunner;
pub use types::*;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        presets, ActionableRecommendation, AggregatedMetrics, Agreement, Archetype, Bug,
        BugSeverity, Consensus, ContentUnderTest, Grade, KnowledgeLevel, ModelClient, ModelError,
        ModelTier, OrchestratorConfig, Pacing, PlaytestError, PlaytestOrchestrator,
        PlaytestResult, Recommendation, ScriptedModelClient, SwarmRunResult, SwarmStats,
        TestResult, TesterConfig,
    };
}

//! Tester roster and per-tester statistics

use crate::types::{Archetype, KnowledgeLevel, TestResult, TesterConfig, TesterId, TesterStats};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// A registered tester together with its running statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredTester {
    pub config: TesterConfig,
    pub stats: TesterStats,
}

/// Per-tester line of [`SwarmStats`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TesterBreakdown {
    pub tester_id: TesterId,
    pub name: String,
    pub archetype: Archetype,
    pub knowledge_level: KnowledgeLevel,
    pub tests_completed: u64,
    pub bugs_found: u64,
    pub average_engagement: f64,
}

/// Snapshot returned by `stats()`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwarmStats {
    pub tester_count: usize,
    /// Tests attempted across all runs since the last reset
    pub total_tests_run: u64,
    /// Bugs reported across all runs since the last reset
    pub total_bugs_found: u64,
    /// One entry per tester, in registration order
    pub tester_breakdown: Vec<TesterBreakdown>,
}

/// Ordered roster of testers.
///
/// Registration order is preserved; registering an existing ID replaces its
/// configuration in place and keeps its statistics.
#[derive(Debug, Default)]
pub struct TesterRegistry {
    testers: Vec<RegisteredTester>,
    index: HashMap<TesterId, usize>,
    total_tests_run: u64,
    total_bugs_found: u64,
}

impl TesterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tester by ID
    pub fn register(&mut self, config: TesterConfig) {
        if let Some(&slot) = self.index.get(&config.id) {
            debug!(tester_id = %config.id, "Replacing tester configuration");
            self.testers[slot].config = config;
            return;
        }

        info!(tester_id = %config.id, archetype = %config.archetype, "Registered tester");
        self.index.insert(config.id.clone(), self.testers.len());
        self.testers.push(RegisteredTester {
            config,
            stats: TesterStats::default(),
        });
    }

    pub fn len(&self) -> usize {
        self.testers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.testers.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&RegisteredTester> {
        self.index.get(id).map(|&slot| &self.testers[slot])
    }

    /// Tester configurations in registration order
    pub fn configs(&self) -> Vec<TesterConfig> {
        self.testers.iter().map(|t| t.config.clone()).collect()
    }

    /// Apply one run's results in a single pass.
    ///
    /// Results for IDs no longer in the roster are ignored.
    pub fn apply_results(&mut self, results: &[TestResult]) {
        for result in results {
            let Some(&slot) = self.index.get(&result.tester_id) else {
                continue;
            };

            self.testers[slot].stats.record(result);
            self.total_tests_run += 1;
            if let Some(parsed) = result.response() {
                self.total_bugs_found += parsed.bugs.len() as u64;
            }
        }
    }

    pub fn stats(&self) -> SwarmStats {
        SwarmStats {
            tester_count: self.testers.len(),
            total_tests_run: self.total_tests_run,
            total_bugs_found: self.total_bugs_found,
            tester_breakdown: self
                .testers
                .iter()
                .map(|t| TesterBreakdown {
                    tester_id: t.config.id.clone(),
                    name: t.config.name.clone(),
                    archetype: t.config.archetype,
                    knowledge_level: t.config.knowledge_level,
                    tests_completed: t.stats.tests_completed,
                    bugs_found: t.stats.bugs_found,
                    average_engagement: t.stats.average_engagement,
                })
                .collect(),
        }
    }

    /// Zero all statistics while keeping the roster
    pub fn reset(&mut self) {
        for tester in &mut self.testers {
            tester.stats = TesterStats::default();
        }
        self.total_tests_run = 0;
        self.total_bugs_found = 0;
        info!(testers = self.testers.len(), "Tester statistics reset");
    }
}

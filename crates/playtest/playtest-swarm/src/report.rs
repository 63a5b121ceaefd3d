//! Final report assembly and grading

use crate::{
    aggregation::AggregatedMetrics,
    config::ModelTier,
    consensus::Consensus,
    recommendations::ActionableRecommendation,
    types::{BugSeverity, ContentUnderTest, Recommendation, TestResult},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Letter grade summarizing content quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Grade::A,
            80..=89 => Grade::B,
            70..=79 => Grade::C,
            60..=69 => Grade::D,
            _ => Grade::F,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(letter)
    }
}

/// Bookkeeping about how a run was executed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestingDetails {
    pub run_id: Uuid,
    pub tester_count: usize,
    pub successful_tests: usize,
    pub failed_tests: usize,
    /// Wall-clock duration of the whole run
    pub duration_ms: u64,
    pub content_type: String,
    pub content_name: String,
    pub parallel: bool,
    pub model: ModelTier,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmReport {
    pub grade: Grade,
    /// 0-100
    pub grade_score: u32,
    pub ready_for_production: bool,
    pub testing_details: TestingDetails,
}

/// Everything produced by one swarm run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmRunResult {
    pub test_count: usize,
    /// One result per tester, in registration order
    pub individual_results: Vec<TestResult>,
    pub aggregated_metrics: AggregatedMetrics,
    pub consensus: Consensus,
    pub recommendations: Vec<ActionableRecommendation>,
    pub report: SwarmReport,
}

/// How a run was executed, as seen by the coordinator
#[derive(Debug, Clone, Copy)]
pub struct RunContext {
    pub run_id: Uuid,
    pub parallel: bool,
    pub model: ModelTier,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// Grades a run and packages the final [`SwarmRunResult`]
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportAssembler;

impl ReportAssembler {
    /// Score from completion, engagement and merged bug severities
    pub fn grade_score(metrics: &AggregatedMetrics) -> u32 {
        if metrics.successful_tests == 0 {
            return 0;
        }

        let base = 0.5 * f64::from(metrics.completion_rate) + 5.0 * metrics.average_engagement;
        let penalty = 20 * metrics.bugs_with_severity(BugSeverity::Critical)
            + 10 * metrics.bugs_with_severity(BugSeverity::Major)
            + 2 * metrics.bugs_with_severity(BugSeverity::Minor);

        (base - penalty as f64).round().clamp(0.0, 100.0) as u32
    }

    pub fn ready_for_production(grade: Grade, metrics: &AggregatedMetrics, consensus: &Consensus) -> bool {
        matches!(grade, Grade::A | Grade::B)
            && !metrics.has_critical_bugs()
            && consensus.recommendation != Recommendation::Fail
    }

    pub fn assemble(
        content: &ContentUnderTest,
        context: RunContext,
        individual_results: Vec<TestResult>,
        aggregated_metrics: AggregatedMetrics,
        consensus: Consensus,
        recommendations: Vec<ActionableRecommendation>,
    ) -> SwarmRunResult {
        let grade_score = Self::grade_score(&aggregated_metrics);
        let grade = Grade::from_score(grade_score);
        let ready_for_production = Self::ready_for_production(grade, &aggregated_metrics, &consensus);

        let testing_details = TestingDetails {
            run_id: context.run_id,
            tester_count: individual_results.len(),
            successful_tests: aggregated_metrics.successful_tests,
            failed_tests: aggregated_metrics.failed_tests,
            duration_ms: context.duration_ms,
            content_type: content.content_type.clone(),
            content_name: content.name.clone(),
            parallel: context.parallel,
            model: context.model,
            timestamp: context.timestamp,
        };

        SwarmRunResult {
            test_count: individual_results.len(),
            individual_results,
            aggregated_metrics,
            consensus,
            recommendations,
            report: SwarmReport {
                grade,
                grade_score,
                ready_for_production,
                testing_details,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aggregation::MetricsAggregator,
        consensus::ConsensusBuilder,
        parser::ParsedResponse,
        recommendations::RecommendationEngine,
        types::{Archetype, Bug, KnowledgeLevel, TesterConfig},
    };

    fn result(id: &str, parsed: ParsedResponse) -> TestResult {
        let tester = TesterConfig::new(id, id, Archetype::Completionist, KnowledgeLevel::Expert);
        TestResult::from_response(&tester, parsed, 1)
    }

    fn assemble(results: Vec<TestResult>) -> SwarmRunResult {
        let metrics = MetricsAggregator::aggregate(&results);
        let consensus = ConsensusBuilder::build(&results, &metrics);
        let recommendations = RecommendationEngine::generate(&metrics);
        let context = RunContext {
            run_id: Uuid::new_v4(),
            parallel: true,
            model: ModelTier::Balanced,
            duration_ms: 42,
            timestamp: Utc::now(),
        };
        ReportAssembler::assemble(
            &ContentUnderTest::new("quest", "Ashen Road"),
            context,
            results,
            metrics,
            consensus,
            recommendations,
        )
    }

    #[test]
    fn test_grade_letters() {
        assert_eq!(Grade::from_score(100), Grade::A);
        assert_eq!(Grade::from_score(90), Grade::A);
        assert_eq!(Grade::from_score(89), Grade::B);
        assert_eq!(Grade::from_score(80), Grade::B);
        assert_eq!(Grade::from_score(70), Grade::C);
        assert_eq!(Grade::from_score(60), Grade::D);
        assert_eq!(Grade::from_score(59), Grade::F);
        assert_eq!(Grade::from_score(0), Grade::F);
    }

    #[test]
    fn test_clean_run_is_ready() {
        let parsed = ParsedResponse {
            completed: true,
            engagement: 9,
            recommendation: Recommendation::Pass,
            ..ParsedResponse::default()
        };
        let run = assemble(vec![result("a", parsed)]);

        // 0.5 * 100 + 5 * 9
        assert_eq!(run.report.grade_score, 95);
        assert_eq!(run.report.grade, Grade::A);
        assert!(run.report.ready_for_production);
        assert_eq!(run.report.testing_details.tester_count, 1);
        assert_eq!(run.report.testing_details.content_name, "Ashen Road");
        assert_eq!(run.report.testing_details.duration_ms, 42);
    }

    #[test]
    fn test_critical_bug_blocks_release() {
        let parsed = ParsedResponse {
            completed: true,
            engagement: 10,
            recommendation: Recommendation::Pass,
            bugs: vec![Bug::new("Crash on load", BugSeverity::Critical)],
            ..ParsedResponse::default()
        };
        let run = assemble(vec![result("a", parsed)]);

        assert_eq!(run.report.grade_score, 80);
        assert_eq!(run.report.grade, Grade::B);
        assert!(!run.report.ready_for_production);
    }

    #[test]
    fn test_fail_consensus_blocks_release() {
        let parsed = ParsedResponse {
            completed: true,
            engagement: 10,
            recommendation: Recommendation::Fail,
            ..ParsedResponse::default()
        };
        let run = assemble(vec![result("a", parsed)]);
        assert_eq!(run.report.grade, Grade::A);
        assert!(!run.report.ready_for_production);
    }

    #[test]
    fn test_score_is_clamped_and_zero_without_successes() {
        let parsed = ParsedResponse {
            bugs: (0..6)
                .map(|i| Bug::new(format!("crash {i}"), BugSeverity::Critical))
                .collect(),
            ..ParsedResponse::default()
        };
        let run = assemble(vec![result("a", parsed)]);
        assert_eq!(run.report.grade_score, 0);
        assert_eq!(run.report.grade, Grade::F);

        let tester = TesterConfig::new("x", "x", Archetype::Casual, KnowledgeLevel::Beginner);
        let run = assemble(vec![TestResult::failure(&tester, "AI API Error", 1)]);
        assert_eq!(run.report.grade_score, 0);
        assert!(!run.report.ready_for_production);
        assert_eq!(run.report.testing_details.failed_tests, 1);
    }
}

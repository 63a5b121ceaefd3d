//! Prioritized action items derived from a run

use crate::{
    aggregation::AggregatedMetrics,
    types::{BugSeverity, Pacing},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Completion rate below which completion is a high priority
pub const COMPLETION_HIGH_THRESHOLD: u32 = 70;
/// Completion rate below which completion is a medium priority
pub const COMPLETION_MEDIUM_THRESHOLD: u32 = 90;
pub const DIFFICULTY_TOO_HARD: f64 = 8.0;
pub const DIFFICULTY_TOO_EASY: f64 = 3.0;
pub const ENGAGEMENT_HIGH_THRESHOLD: f64 = 5.0;
pub const ENGAGEMENT_MEDIUM_THRESHOLD: f64 = 7.0;
/// Share of off-tempo pacing votes that triggers a pacing item
pub const PACING_SKEW_THRESHOLD: f64 = 0.4;

/// Urgency of an action item, most urgent first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

/// Area an action item concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Bugs,
    Completion,
    Difficulty,
    Engagement,
    Pacing,
    Quality,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::Info => "info",
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Bugs => "bugs",
            Category::Completion => "completion",
            Category::Difficulty => "difficulty",
            Category::Engagement => "engagement",
            Category::Pacing => "pacing",
            Category::Quality => "quality",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionableRecommendation {
    pub priority: Priority,
    pub category: Category,
    pub message: String,
    pub action: String,
}

impl ActionableRecommendation {
    fn new(
        priority: Priority,
        category: Category,
        message: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            priority,
            category,
            message: message.into(),
            action: action.into(),
        }
    }
}

/// Turns aggregated metrics into action items.
///
/// Always yields at least one item. Items are sorted by priority then
/// category; rules that land in the same bucket keep rule order.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    pub fn generate(metrics: &AggregatedMetrics) -> Vec<ActionableRecommendation> {
        let mut items = Vec::new();

        if metrics.successful_tests == 0 {
            items.push(ActionableRecommendation::new(
                Priority::Critical,
                Category::Quality,
                format!(
                    "None of the {} testers produced usable feedback",
                    metrics.total_tests
                ),
                "Check model availability and rerun the playtest before drawing conclusions",
            ));
        }

        let critical = metrics.bugs_with_severity(BugSeverity::Critical);
        if critical > 0 {
            items.push(ActionableRecommendation::new(
                Priority::Critical,
                Category::Bugs,
                format!("{critical} critical bug(s) reported: {}", bug_list(metrics, BugSeverity::Critical)),
                "Fix all critical bugs before release",
            ));
        }

        let major = metrics.bugs_with_severity(BugSeverity::Major);
        if major > 0 {
            items.push(ActionableRecommendation::new(
                Priority::High,
                Category::Bugs,
                format!("{major} major bug(s) reported: {}", bug_list(metrics, BugSeverity::Major)),
                "Prioritize major bugs in the next iteration",
            ));
        }

        if metrics.successful_tests > 0 {
            Self::completion(metrics, &mut items);
            Self::difficulty(metrics, &mut items);
            Self::engagement(metrics, &mut items);
            Self::pacing(metrics, &mut items);

            if metrics.testers_with_confusion * 2 >= metrics.successful_tests
                && metrics.testers_with_confusion > 0
            {
                items.push(ActionableRecommendation::new(
                    Priority::Low,
                    Category::Quality,
                    format!(
                        "{} of {} testers reported confusion",
                        metrics.testers_with_confusion, metrics.successful_tests
                    ),
                    "Clarify objectives, hints and dialogue around the reported confusion points",
                ));
            }
        }

        if metrics.failed_tests > 0 && metrics.successful_tests > 0 {
            items.push(ActionableRecommendation::new(
                Priority::Low,
                Category::Quality,
                format!(
                    "{} of {} testers failed to respond",
                    metrics.failed_tests, metrics.total_tests
                ),
                "Rerun the failed testers to complete coverage",
            ));
        }

        if items.is_empty() {
            items.push(ActionableRecommendation::new(
                Priority::Info,
                Category::Quality,
                "Content is in good shape",
                "No changes required; consider a final human playtest",
            ));
        }

        items.sort_by_key(|item| (item.priority, item.category));
        items
    }

    fn completion(metrics: &AggregatedMetrics, items: &mut Vec<ActionableRecommendation>) {
        let rate = metrics.completion_rate;
        let priority = if rate < COMPLETION_HIGH_THRESHOLD {
            Priority::High
        } else if rate < COMPLETION_MEDIUM_THRESHOLD {
            Priority::Medium
        } else {
            return;
        };
        items.push(ActionableRecommendation::new(
            priority,
            Category::Completion,
            format!("Only {rate}% of testers completed the content"),
            "Review blockers and unclear objectives that stop players from finishing",
        ));
    }

    fn difficulty(metrics: &AggregatedMetrics, items: &mut Vec<ActionableRecommendation>) {
        let difficulty = metrics.average_difficulty;
        if difficulty > DIFFICULTY_TOO_HARD {
            items.push(ActionableRecommendation::new(
                Priority::Medium,
                Category::Difficulty,
                format!("Content is too hard (average difficulty {difficulty:.1}/10)"),
                "Reduce difficulty or add guidance for struggling players",
            ));
        } else if difficulty < DIFFICULTY_TOO_EASY {
            items.push(ActionableRecommendation::new(
                Priority::Medium,
                Category::Difficulty,
                format!("Content is too easy (average difficulty {difficulty:.1}/10)"),
                "Add challenge or optional harder objectives",
            ));
        }
    }

    fn engagement(metrics: &AggregatedMetrics, items: &mut Vec<ActionableRecommendation>) {
        let engagement = metrics.average_engagement;
        let priority = if engagement < ENGAGEMENT_HIGH_THRESHOLD {
            Priority::High
        } else if engagement < ENGAGEMENT_MEDIUM_THRESHOLD {
            Priority::Medium
        } else {
            return;
        };
        items.push(ActionableRecommendation::new(
            priority,
            Category::Engagement,
            format!("Low engagement (average {engagement:.1}/10)"),
            "Strengthen rewards, narrative hooks and player choice",
        ));
    }

    fn pacing(metrics: &AggregatedMetrics, items: &mut Vec<ActionableRecommendation>) {
        let pacing = &metrics.pacing_distribution;
        let too_fast = pacing.get(Pacing::TooFast);
        let too_slow = pacing.get(Pacing::TooSlow);
        let skewed = (too_fast + too_slow) as f64 / metrics.successful_tests as f64;
        if skewed <= PACING_SKEW_THRESHOLD {
            return;
        }

        let (direction, action) = if too_fast >= too_slow {
            ("too fast", "Add breathing room between beats and slow down reveals")
        } else {
            ("too slow", "Tighten filler sections and shorten travel between objectives")
        };
        items.push(ActionableRecommendation::new(
            Priority::Medium,
            Category::Pacing,
            format!(
                "{} of {} testers found the pacing {direction}",
                too_fast.max(too_slow),
                metrics.successful_tests
            ),
            action,
        ));
    }
}

fn bug_list(metrics: &AggregatedMetrics, severity: BugSeverity) -> String {
    metrics
        .bug_reports
        .iter()
        .filter(|bug| bug.severity == severity)
        .map(|bug| bug.description.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aggregation::MetricsAggregator,
        parser::ParsedResponse,
        types::{Archetype, Bug, KnowledgeLevel, TestResult, TesterConfig},
    };

    fn tester(id: &str) -> TesterConfig {
        TesterConfig::new(id, id, Archetype::Explorer, KnowledgeLevel::Intermediate)
    }

    fn healthy() -> ParsedResponse {
        ParsedResponse {
            completed: true,
            difficulty: 5,
            engagement: 8,
            pacing: Pacing::JustRight,
            ..ParsedResponse::default()
        }
    }

    fn generate(results: &[TestResult]) -> Vec<ActionableRecommendation> {
        RecommendationEngine::generate(&MetricsAggregator::aggregate(results))
    }

    #[test]
    fn test_healthy_run_yields_info() {
        let items = generate(&[TestResult::from_response(&tester("a"), healthy(), 1)]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].priority, Priority::Info);
        assert_eq!(items[0].category, Category::Quality);
    }

    #[test]
    fn test_all_failed_is_critical_quality() {
        let items = generate(&[TestResult::failure(&tester("a"), "AI API Error", 1)]);
        assert_eq!(items[0].priority, Priority::Critical);
        assert_eq!(items[0].category, Category::Quality);
        assert!(items.iter().all(|i| i.category != Category::Completion));
    }

    #[test]
    fn test_bugs_and_low_metrics_are_sorted() {
        let parsed = ParsedResponse {
            completed: false,
            difficulty: 9,
            engagement: 4,
            pacing: Pacing::TooSlow,
            bugs: vec![
                Bug::new("Soft lock at bridge", BugSeverity::Critical),
                Bug::new("Door clips", BugSeverity::Major),
            ],
            confusion_points: vec!["Where is the key?".into()],
            ..ParsedResponse::default()
        };
        let items = generate(&[TestResult::from_response(&tester("a"), parsed, 1)]);

        let keys: Vec<_> = items.iter().map(|i| (i.priority, i.category)).collect();
        assert_eq!(
            keys,
            vec![
                (Priority::Critical, Category::Bugs),
                (Priority::High, Category::Bugs),
                (Priority::High, Category::Completion),
                (Priority::High, Category::Engagement),
                (Priority::Medium, Category::Difficulty),
                (Priority::Medium, Category::Pacing),
                (Priority::Low, Category::Quality),
            ]
        );
        assert!(items[0].message.contains("Soft lock at bridge"));
        assert!(items[5].message.contains("too slow"));
    }

    #[test]
    fn test_medium_thresholds() {
        let mut results: Vec<_> = (0..9)
            .map(|i| {
                let parsed = ParsedResponse {
                    engagement: 6,
                    ..healthy()
                };
                TestResult::from_response(&tester(&format!("t{i}")), parsed, 1)
            })
            .collect();
        let mut unfinished = healthy();
        unfinished.completed = false;
        unfinished.engagement = 6;
        results.push(TestResult::from_response(&tester("late"), unfinished, 1));

        let items = generate(&results);
        let keys: Vec<_> = items.iter().map(|i| (i.priority, i.category)).collect();
        assert!(keys.contains(&(Priority::Medium, Category::Engagement)));
        assert!(!keys.contains(&(Priority::Medium, Category::Completion)));
    }

    #[test]
    fn test_partial_failures_are_noted() {
        let items = generate(&[
            TestResult::from_response(&tester("a"), healthy(), 1),
            TestResult::from_response(&tester("b"), healthy(), 1),
            TestResult::failure(&tester("c"), "timeout", 1),
        ]);
        assert!(items
            .iter()
            .any(|i| i.priority == Priority::Low && i.message.contains("failed to respond")));
        // 67% completion
        assert!(items
            .iter()
            .any(|i| i.priority == Priority::High && i.category == Category::Completion));
    }
}

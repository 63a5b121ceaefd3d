//! Swarm-wide metric aggregation

use crate::{
    parser::ParsedResponse,
    types::{Archetype, BugSeverity, KnowledgeLevel, Pacing, TestResult},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A bug merged across every tester that reported it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugReport {
    /// First-seen spelling of the description
    pub description: String,
    /// Highest severity among merged occurrences
    pub severity: BugSeverity,
    /// Number of occurrences merged into this report
    pub report_count: usize,
    /// Tester names, one per occurrence
    pub reported_by: Vec<String>,
}

/// Average of one rating within a tester group
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupAverage {
    pub average: f64,
    /// Successful results in the group
    pub count: usize,
}

/// Pacing votes across successful results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingDistribution {
    pub too_fast: usize,
    pub just_right: usize,
    pub too_slow: usize,
    pub unknown: usize,
}

impl PacingDistribution {
    fn record(&mut self, pacing: Pacing) {
        match pacing {
            Pacing::TooFast => self.too_fast += 1,
            Pacing::JustRight => self.just_right += 1,
            Pacing::TooSlow => self.too_slow += 1,
            Pacing::Unknown => self.unknown += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.too_fast + self.just_right + self.too_slow + self.unknown
    }

    pub fn get(&self, pacing: Pacing) -> usize {
        match pacing {
            Pacing::TooFast => self.too_fast,
            Pacing::JustRight => self.just_right,
            Pacing::TooSlow => self.too_slow,
            Pacing::Unknown => self.unknown,
        }
    }
}

/// Metrics aggregated over one swarm run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    /// Every result, failed ones included
    pub total_tests: usize,
    pub successful_tests: usize,
    pub failed_tests: usize,
    /// Percentage (0-100) of all tests that succeeded and finished the content
    pub completion_rate: u32,
    /// Mean over successful results, 0 when none
    pub average_difficulty: f64,
    /// Mean over successful results, 0 when none
    pub average_engagement: f64,
    pub pacing_distribution: PacingDistribution,
    /// Merged reports, most severe first
    pub bug_reports: Vec<BugReport>,
    /// Difficulty by knowledge level
    pub by_knowledge_level: BTreeMap<KnowledgeLevel, GroupAverage>,
    /// Engagement by archetype
    pub by_archetype: BTreeMap<Archetype, GroupAverage>,
    /// Successful testers that reported at least one confusion point
    pub testers_with_confusion: usize,
}

impl AggregatedMetrics {
    /// Number of merged bug reports at `severity`
    pub fn bugs_with_severity(&self, severity: BugSeverity) -> usize {
        self.bug_reports
            .iter()
            .filter(|bug| bug.severity == severity)
            .count()
    }

    pub fn has_critical_bugs(&self) -> bool {
        self.bugs_with_severity(BugSeverity::Critical) > 0
    }
}

/// Computes [`AggregatedMetrics`] from a run's results
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsAggregator;

impl MetricsAggregator {
    pub fn aggregate(results: &[TestResult]) -> AggregatedMetrics {
        let successful: Vec<(&TestResult, &ParsedResponse)> = results
            .iter()
            .filter_map(|r| r.response().map(|parsed| (r, parsed)))
            .collect();
        let total_tests = results.len();

        let finished = results.iter().filter(|r| r.finished()).count();
        let completion_rate = if total_tests == 0 {
            0
        } else {
            (100.0 * finished as f64 / total_tests as f64).round() as u32
        };

        let mut pacing_distribution = PacingDistribution::default();
        for (_, parsed) in &successful {
            pacing_distribution.record(parsed.pacing);
        }

        AggregatedMetrics {
            total_tests,
            successful_tests: successful.len(),
            failed_tests: total_tests - successful.len(),
            completion_rate,
            average_difficulty: mean(successful.iter().map(|(_, p)| p.difficulty)),
            average_engagement: mean(successful.iter().map(|(_, p)| p.engagement)),
            pacing_distribution,
            bug_reports: merge_bug_reports(&successful),
            by_knowledge_level: group_average(results, |r| r.knowledge_level, |p| p.difficulty),
            by_archetype: group_average(results, |r| r.archetype, |p| p.engagement),
            testers_with_confusion: successful
                .iter()
                .filter(|(_, p)| !p.confusion_points.is_empty())
                .count(),
        }
    }
}

/// Round to one decimal place
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean(values: impl Iterator<Item = u8>) -> f64 {
    let (sum, count) = values.fold((0u64, 0u64), |(sum, count), v| (sum + u64::from(v), count + 1));
    if count == 0 {
        0.0
    } else {
        round1(sum as f64 / count as f64)
    }
}

fn group_average<K, FK, FV>(results: &[TestResult], key: FK, value: FV) -> BTreeMap<K, GroupAverage>
where
    K: Ord,
    FK: Fn(&TestResult) -> K,
    FV: Fn(&ParsedResponse) -> u8,
{
    let mut sums: BTreeMap<K, (u64, usize)> = BTreeMap::new();
    for result in results {
        let entry = sums.entry(key(result)).or_default();
        if let Some(parsed) = result.response() {
            entry.0 += u64::from(value(parsed));
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(k, (sum, count))| {
            let average = if count == 0 {
                0.0
            } else {
                round1(sum as f64 / count as f64)
            };
            (k, GroupAverage { average, count })
        })
        .collect()
}

/// Merge bugs by case-insensitive description across testers
fn merge_bug_reports(successful: &[(&TestResult, &ParsedResponse)]) -> Vec<BugReport> {
    let mut reports: Vec<BugReport> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for (result, parsed) in successful {
        for bug in &parsed.bugs {
            let key = bug.description.trim().to_lowercase();
            match by_key.get(&key) {
                Some(&slot) => {
                    let report = &mut reports[slot];
                    report.severity = report.severity.max(bug.severity);
                    report.report_count += 1;
                    report.reported_by.push(result.tester_name.clone());
                }
                None => {
                    by_key.insert(key, reports.len());
                    reports.push(BugReport {
                        description: bug.description.trim().to_string(),
                        severity: bug.severity,
                        report_count: 1,
                        reported_by: vec![result.tester_name.clone()],
                    });
                }
            }
        }
    }

    // Stable: ties keep first-seen order
    reports.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| b.report_count.cmp(&a.report_count))
    });
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bug, TesterConfig};

    fn result(
        id: &str,
        archetype: Archetype,
        level: KnowledgeLevel,
        apply: impl FnOnce(&mut ParsedResponse),
    ) -> TestResult {
        let tester = TesterConfig::new(id, format!("Tester {id}"), archetype, level);
        let mut parsed = ParsedResponse::default();
        apply(&mut parsed);
        TestResult::from_response(&tester, parsed, 10)
    }

    fn failed(id: &str, archetype: Archetype, level: KnowledgeLevel) -> TestResult {
        let tester = TesterConfig::new(id, format!("Tester {id}"), archetype, level);
        TestResult::failure(&tester, "AI API Error", 10)
    }

    #[test]
    fn test_empty_results() {
        let metrics = MetricsAggregator::aggregate(&[]);
        assert_eq!(metrics.total_tests, 0);
        assert_eq!(metrics.completion_rate, 0);
        assert_eq!(metrics.average_difficulty, 0.0);
        assert_eq!(metrics.average_engagement, 0.0);
        assert!(metrics.bug_reports.is_empty());
    }

    #[test]
    fn test_failures_count_toward_totals_only() {
        let results = vec![
            result("a", Archetype::Casual, KnowledgeLevel::Beginner, |p| {
                p.completed = true;
                p.difficulty = 4;
                p.engagement = 8;
                p.pacing = Pacing::JustRight;
            }),
            failed("b", Archetype::Casual, KnowledgeLevel::Expert),
            result("c", Archetype::Breaker, KnowledgeLevel::Beginner, |p| {
                p.completed = false;
                p.difficulty = 7;
                p.engagement = 5;
                p.pacing = Pacing::TooSlow;
            }),
        ];

        let metrics = MetricsAggregator::aggregate(&results);

        assert_eq!(metrics.total_tests, 3);
        assert_eq!(metrics.successful_tests, 2);
        assert_eq!(metrics.failed_tests, 1);
        assert_eq!(metrics.completion_rate, 33);
        assert_eq!(metrics.average_difficulty, 5.5);
        assert_eq!(metrics.average_engagement, 6.5);
        assert_eq!(metrics.pacing_distribution.just_right, 1);
        assert_eq!(metrics.pacing_distribution.too_slow, 1);
        assert_eq!(metrics.pacing_distribution.total(), 2);

        let beginners = metrics.by_knowledge_level[&KnowledgeLevel::Beginner];
        assert_eq!(beginners.count, 2);
        assert_eq!(beginners.average, 5.5);
        let experts = metrics.by_knowledge_level[&KnowledgeLevel::Expert];
        assert_eq!(experts.count, 0);
        assert_eq!(experts.average, 0.0);

        let casual = metrics.by_archetype[&Archetype::Casual];
        assert_eq!(casual.count, 1);
        assert_eq!(casual.average, 8.0);
    }

    #[test]
    fn test_bug_merge_is_case_insensitive_and_keeps_max_severity() {
        let results = vec![
            result("a", Archetype::Explorer, KnowledgeLevel::Expert, |p| {
                p.bugs = vec![
                    Bug::new("Door does not open", BugSeverity::Minor),
                    Bug::new("Typo in journal", BugSeverity::Minor),
                ];
            }),
            result("b", Archetype::Breaker, KnowledgeLevel::Expert, |p| {
                p.bugs = vec![Bug::new("door does NOT open", BugSeverity::Critical)];
            }),
        ];

        let metrics = MetricsAggregator::aggregate(&results);

        assert_eq!(metrics.bug_reports.len(), 2);
        let door = &metrics.bug_reports[0];
        assert_eq!(door.description, "Door does not open");
        assert_eq!(door.severity, BugSeverity::Critical);
        assert_eq!(door.report_count, 2);
        assert_eq!(door.reported_by, vec!["Tester a", "Tester b"]);
        assert!(metrics.has_critical_bugs());
        assert_eq!(metrics.bugs_with_severity(BugSeverity::Minor), 1);
    }
}

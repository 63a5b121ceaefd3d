//! Majority-vote consensus across successful testers

use crate::{
    aggregation::AggregatedMetrics,
    types::{Recommendation, TestResult},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence at or above which agreement is strong
pub const STRONG_AGREEMENT_THRESHOLD: f64 = 0.8;

/// How firmly the swarm agrees on its recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agreement {
    Strong,
    Moderate,
}

impl Agreement {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= STRONG_AGREEMENT_THRESHOLD {
            Agreement::Strong
        } else {
            Agreement::Moderate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Agreement::Strong => "strong",
            Agreement::Moderate => "moderate",
        }
    }
}

impl fmt::Display for Agreement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Swarm-wide verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consensus {
    pub recommendation: Recommendation,
    /// Share of voters backing `recommendation`, in `[0, 1]`
    pub confidence: f64,
    pub agreement: Agreement,
    /// Number of successful results that voted
    pub voters: usize,
    pub summary: String,
}

/// Tallies individual recommendations into a [`Consensus`].
///
/// Only successful results vote. Ties go to the more conservative outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsensusBuilder;

impl ConsensusBuilder {
    pub fn build(results: &[TestResult], metrics: &AggregatedMetrics) -> Consensus {
        let mut votes = [0usize; 3];
        for parsed in results.iter().filter_map(TestResult::response) {
            votes[vote_slot(parsed.recommendation)] += 1;
        }
        let voters: usize = votes.iter().sum();

        if voters == 0 {
            return Consensus {
                recommendation: Recommendation::Fail,
                confidence: 0.0,
                agreement: Agreement::Moderate,
                voters: 0,
                summary: format!(
                    "No tester produced usable feedback ({} of {} failed); treating the content as not ready.",
                    metrics.failed_tests, metrics.total_tests
                ),
            };
        }

        // ALL is ordered least to most conservative, so scanning in reverse
        // and keeping only strictly larger tallies breaks ties conservatively.
        let mut winner = Recommendation::Fail;
        let mut best = 0;
        for recommendation in Recommendation::ALL.iter().rev() {
            let count = votes[vote_slot(*recommendation)];
            if count > best {
                best = count;
                winner = *recommendation;
            }
        }

        let confidence = best as f64 / voters as f64;
        let agreement = Agreement::from_confidence(confidence);

        Consensus {
            recommendation: winner,
            confidence,
            agreement,
            voters,
            summary: summarize(winner, agreement, best, voters, metrics),
        }
    }
}

fn vote_slot(recommendation: Recommendation) -> usize {
    match recommendation {
        Recommendation::Pass => 0,
        Recommendation::PassWithChanges => 1,
        Recommendation::Fail => 2,
    }
}

fn summarize(
    recommendation: Recommendation,
    agreement: Agreement,
    votes: usize,
    voters: usize,
    metrics: &AggregatedMetrics,
) -> String {
    let verdict = match recommendation {
        Recommendation::Pass => "pass",
        Recommendation::PassWithChanges => "pass with changes",
        Recommendation::Fail => "fail",
    };
    format!(
        "{agreement} agreement to {verdict} ({votes}/{voters} testers): {}% completion, \
         difficulty {:.1}/10, engagement {:.1}/10, {} distinct bug(s) reported.",
        metrics.completion_rate,
        metrics.average_difficulty,
        metrics.average_engagement,
        metrics.bug_reports.len()
    )
}

//! Metrics emitted through the `metrics` facade.
//!
//! Nothing here installs a recorder; without one every call is a no-op.
//! Hosts that want Prometheus output install an exporter themselves.

use crate::report::SwarmRunResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use once_cell::sync::Lazy;
use std::time::Duration;

pub const RUNS_TOTAL: &str = "playtest_runs_total";
pub const TESTS_TOTAL: &str = "playtest_tests_total";
pub const TESTS_FAILED_TOTAL: &str = "playtest_tests_failed_total";
pub const TESTS_TIMED_OUT_TOTAL: &str = "playtest_tests_timed_out_total";
pub const BUGS_REPORTED_TOTAL: &str = "playtest_bugs_reported_total";
pub const RUN_DURATION_SECONDS: &str = "playtest_run_duration_seconds";
pub const LAST_GRADE_SCORE: &str = "playtest_last_grade_score";
pub const TESTERS_REGISTERED: &str = "playtest_testers_registered";

static DESCRIBED: Lazy<()> = Lazy::new(|| {
    describe_counter!(RUNS_TOTAL, "Total number of swarm playtest runs");
    describe_counter!(TESTS_TOTAL, "Total number of individual tester runs");
    describe_counter!(TESTS_FAILED_TOTAL, "Tester runs that produced no usable feedback");
    describe_counter!(TESTS_TIMED_OUT_TOTAL, "Tester runs that exceeded the request deadline");
    describe_counter!(BUGS_REPORTED_TOTAL, "Bugs reported by successful testers");
    describe_histogram!(RUN_DURATION_SECONDS, Unit::Seconds, "Wall-clock duration of a swarm run");
    describe_gauge!(LAST_GRADE_SCORE, "Grade score of the most recent run");
    describe_gauge!(TESTERS_REGISTERED, "Number of testers in the roster");
});

/// Register metric descriptions with the installed recorder, once per process
pub fn describe_metrics() {
    Lazy::force(&DESCRIBED);
}

pub fn record_testers_registered(count: usize) {
    gauge!(TESTERS_REGISTERED).set(count as f64);
}

pub fn record_timeout() {
    counter!(TESTS_TIMED_OUT_TOTAL).increment(1);
}

/// Record the outcome of a finished run
pub fn record_run(run: &SwarmRunResult, elapsed: Duration) {
    let metrics = &run.aggregated_metrics;
    let bugs: usize = run
        .individual_results
        .iter()
        .filter_map(|r| r.response())
        .map(|parsed| parsed.bugs.len())
        .sum();

    counter!(RUNS_TOTAL).increment(1);
    counter!(TESTS_TOTAL).increment(metrics.total_tests as u64);
    counter!(TESTS_FAILED_TOTAL).increment(metrics.failed_tests as u64);
    counter!(BUGS_REPORTED_TOTAL).increment(bugs as u64);
    histogram!(RUN_DURATION_SECONDS).record(elapsed.as_secs_f64());
    gauge!(LAST_GRADE_SCORE).set(f64::from(run.report.grade_score));
}

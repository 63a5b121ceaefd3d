//! Demonstration of a swarm playtest against a scripted model client

use playtest_swarm::prelude::*;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const HAPPY_RESPONSE: &str = "\
## Playthrough
Talked to the innkeeper, followed the river and dove into the chapel.
## Completion Status
Completed: Yes
## Difficulty Rating
Difficulty: 6/10
## Engagement Rating
Engagement: 8/10
## Pacing Assessment
Pacing: just_right
## Bugs Found
- [MINOR] Torch clips through the chapel wall
## Confusion Points
None
## Overall Feedback
Atmospheric and well paced.
## Recommendation
Recommendation: pass
";

const CRITICAL_RESPONSE: &str = "\
**Completion Status:** No
**Difficulty Rating:** 8/10
**Engagement Rating:** 5/10
**Pacing Assessment:** too slow in the flooded nave
**Bugs Found:**
- [CRITICAL] Ringing the bell twice soft-locks the quest
- [minor] torch clips through the chapel wall
**Confusion Points:**
- Which lever drains the crypt?
**Recommendation:** fail
";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🎮 Starting playtest swarm demo");

    let client = ScriptedModelClient::new(HAPPY_RESPONSE)
        .respond_to("Glitch", CRITICAL_RESPONSE)
        .delay_on("Wren", Duration::from_millis(300))
        .fail_on("Vex", ModelError::api("AI API Error: rate limited"));

    let config = OrchestratorConfig::default()
        .with_request_timeout_ms(200)
        .with_env_overrides()?;
    let orchestrator = PlaytestOrchestrator::new(config, Arc::new(client))?;
    orchestrator.register_testers(presets::default_roster()).await;
    info!("✅ Registered {} testers", orchestrator.tester_count().await);

    let quest = ContentUnderTest::new("quest", "The Drowned Bell")
        .with_description("Recover a bell from a flooded chapel and ring it at dawn")
        .with_payload(serde_json::json!({
            "objectives": ["Talk to the innkeeper", "Drain the crypt", "Ring the bell"],
            "reward": { "gold": 150, "item": "Tidecaller Charm" }
        }));

    let run = orchestrator.run_swarm_playtest(&quest).await?;

    for result in &run.individual_results {
        match (result.response(), &result.error) {
            (Some(parsed), _) => info!(
                tester = %result.tester_name,
                archetype = %result.archetype,
                completed = parsed.completed,
                difficulty = parsed.difficulty,
                engagement = parsed.engagement,
                recommendation = %parsed.recommendation,
                "Tester finished"
            ),
            (None, error) => warn!(
                tester = %result.tester_name,
                error = error.as_deref().unwrap_or("unknown"),
                "Tester failed"
            ),
        }
    }

    for bug in &run.aggregated_metrics.bug_reports {
        info!(
            severity = %bug.severity,
            reports = bug.report_count,
            "🐛 {}",
            bug.description
        );
    }

    info!("🗳️  {}", run.consensus.summary);
    for item in &run.recommendations {
        info!(priority = ?item.priority, category = ?item.category, "{} -> {}", item.message, item.action);
    }

    info!(
        grade = %run.report.grade,
        score = run.report.grade_score,
        ready = run.report.ready_for_production,
        "📋 Report"
    );
    println!("{}", serde_json::to_string_pretty(&run.report)?);

    let stats = orchestrator.stats().await;
    info!(
        tests = stats.total_tests_run,
        bugs = stats.total_bugs_found,
        "📊 Swarm statistics"
    );

    Ok(())
}

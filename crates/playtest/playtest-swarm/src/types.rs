//! Common types for playtest orchestration

use crate::{
    error::PlaytestError,
    parser::ParsedResponse,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Unique identifier for a tester in the roster
pub type TesterId = String;

/// Implements `as_str`, `Display` and `FromStr` for a closed, snake_case enum.
///
/// Parsing is case-insensitive and treats spaces and hyphens as underscores.
macro_rules! impl_str_enum {
    ($ty:ident, $what:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// All variants in declaration order
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Canonical snake_case spelling
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = PlaytestError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = normalize_token(s);
                match normalized.as_str() {
                    $($name => Ok($ty::$variant),)+
                    _ => Err(PlaytestError::InvalidConfiguration(format!(
                        "unknown {}: '{}'",
                        $what,
                        s.trim()
                    ))),
                }
            }
        }
    };
}

/// Lowercase a token and fold spaces/hyphens into underscores
pub(crate) fn normalize_token(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Behavioral category of a tester
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Completionist,
    Speedrunner,
    Explorer,
    Casual,
    Minmaxer,
    Roleplayer,
    Breaker,
}

impl_str_enum!(Archetype, "archetype", {
    Completionist => "completionist",
    Speedrunner => "speedrunner",
    Explorer => "explorer",
    Casual => "casual",
    Minmaxer => "minmaxer",
    Roleplayer => "roleplayer",
    Breaker => "breaker",
});

impl Archetype {
    /// How a player of this archetype approaches content, used for prompt framing
    pub fn play_style(&self) -> &'static str {
        match self {
            Archetype::Completionist => {
                "Clears every optional objective, collectible and side branch before moving on."
            }
            Archetype::Speedrunner => {
                "Pushes for the fastest route and actively looks for skips and sequence breaks."
            }
            Archetype::Explorer => {
                "Wanders off the critical path to see what the world hides and how it reacts."
            }
            Archetype::Casual => {
                "Plays in short sessions and wants clear guidance without friction or grind."
            }
            Archetype::Minmaxer => {
                "Optimises builds and rewards, hunting for the most efficient strategy."
            }
            Archetype::Roleplayer => {
                "Stays in character and cares about narrative consistency and meaningful choices."
            }
            Archetype::Breaker => {
                "Deliberately tries to break the game with unexpected inputs and edge cases."
            }
        }
    }
}

/// How familiar a tester is with the genre
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeLevel {
    Beginner,
    Intermediate,
    Expert,
}

impl_str_enum!(KnowledgeLevel, "knowledge level", {
    Beginner => "beginner",
    Intermediate => "intermediate",
    Expert => "expert",
});

impl KnowledgeLevel {
    /// Short description used for prompt framing
    pub fn description(&self) -> &'static str {
        match self {
            KnowledgeLevel::Beginner => "new to the genre and its conventions",
            KnowledgeLevel::Intermediate => "comfortable with common genre conventions",
            KnowledgeLevel::Expert => "a veteran who knows the genre inside out",
        }
    }
}

/// Configuration of a single virtual tester. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TesterConfig {
    /// Unique tester ID (registration upserts on this key)
    pub id: TesterId,
    /// Display name, also used when attributing bug reports
    pub name: String,
    /// Behavioral category
    pub archetype: Archetype,
    /// Genre familiarity
    pub knowledge_level: KnowledgeLevel,
    /// Free-form personality text
    #[serde(default)]
    pub personality: String,
    /// What the tester expects from content, in priority order
    #[serde(default)]
    pub expectations: Vec<String>,
}

impl TesterConfig {
    /// Create a tester with no personality text or expectations
    pub fn new(
        id: impl Into<TesterId>,
        name: impl Into<String>,
        archetype: Archetype,
        knowledge_level: KnowledgeLevel,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            archetype,
            knowledge_level,
            personality: String::new(),
            expectations: Vec::new(),
        }
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = personality.into();
        self
    }

    pub fn with_expectation(mut self, expectation: impl Into<String>) -> Self {
        self.expectations.push(expectation.into());
        self
    }

    pub fn with_expectations<I, S>(mut self, expectations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expectations.extend(expectations.into_iter().map(Into::into));
        self
    }
}

/// Mutable per-tester statistics, owned by the registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TesterStats {
    /// Runs attempted, successful or not
    pub tests_completed: u64,
    /// Runs that produced a parsed response
    pub successful_tests: u64,
    /// Bugs reported across successful runs
    pub bugs_found: u64,
    /// Running mean of engagement over successful runs
    pub average_engagement: f64,
}

impl TesterStats {
    /// Fold one run outcome into the statistics
    pub fn record(&mut self, result: &TestResult) {
        self.tests_completed += 1;
        let Some(parsed) = result.response() else {
            return;
        };

        let previous = self.successful_tests as f64;
        self.successful_tests += 1;
        self.bugs_found += parsed.bugs.len() as u64;
        self.average_engagement = (self.average_engagement * previous
            + f64::from(parsed.engagement))
            / self.successful_tests as f64;
    }
}

/// Subjective tempo rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    TooFast,
    JustRight,
    TooSlow,
    #[default]
    Unknown,
}

impl_str_enum!(Pacing, "pacing", {
    TooFast => "too_fast",
    JustRight => "just_right",
    TooSlow => "too_slow",
    Unknown => "unknown",
});

/// Bug severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BugSeverity {
    #[default]
    Minor,
    Major,
    Critical,
}

impl_str_enum!(BugSeverity, "bug severity", {
    Minor => "minor",
    Major => "major",
    Critical => "critical",
});

/// A single bug as reported by one tester
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bug {
    pub description: String,
    pub severity: BugSeverity,
}

impl Bug {
    pub fn new(description: impl Into<String>, severity: BugSeverity) -> Self {
        Self {
            description: description.into(),
            severity,
        }
    }
}

/// A tester's verdict, ordered from least to most conservative
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Pass,
    #[default]
    PassWithChanges,
    Fail,
}

impl_str_enum!(Recommendation, "recommendation", {
    Pass => "pass",
    PassWithChanges => "pass_with_changes",
    Fail => "fail",
});

/// The piece of game content handed to the swarm.
///
/// The payload is opaque to the orchestrator and only embedded in prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentUnderTest {
    /// Kind of content, e.g. "quest", "dialogue", "npc"
    pub content_type: String,
    /// Human readable name
    pub name: String,
    /// Short description for testers
    #[serde(default)]
    pub description: String,
    /// Structured content data
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl ContentUnderTest {
    pub fn new(content_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            name: name.into(),
            description: String::new(),
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Outcome of one tester's run.
///
/// Failed results keep the tester identity and carry `error`; they have no
/// parsed feedback. They are never dropped from a run.
///
/// The parsed fields are flattened, so a successful result serializes with
/// `completed`, `difficulty`, ... next to `tester_id`, and a failed one
/// without any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub tester_id: TesterId,
    pub tester_name: String,
    pub archetype: Archetype,
    pub knowledge_level: KnowledgeLevel,
    /// Whether the model call succeeded and was parsed
    pub success: bool,
    /// Present iff `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Present iff `success` is true
    #[serde(flatten)]
    response: Option<ParsedResponse>,
    /// Wall-clock time spent on this tester
    pub duration_ms: u64,
}

impl TestResult {
    /// Build a successful result from a parsed response
    pub fn from_response(tester: &TesterConfig, parsed: ParsedResponse, duration_ms: u64) -> Self {
        Self {
            tester_id: tester.id.clone(),
            tester_name: tester.name.clone(),
            archetype: tester.archetype,
            knowledge_level: tester.knowledge_level,
            success: true,
            error: None,
            response: Some(parsed),
            duration_ms,
        }
    }

    /// Build a failed result carrying only identity and the error message
    pub fn failure(tester: &TesterConfig, error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            tester_id: tester.id.clone(),
            tester_name: tester.name.clone(),
            archetype: tester.archetype,
            knowledge_level: tester.knowledge_level,
            success: false,
            error: Some(error.into()),
            response: None,
            duration_ms,
        }
    }

    /// Parsed feedback, `None` for failed results
    pub fn response(&self) -> Option<&ParsedResponse> {
        self.response.as_ref()
    }

    /// Successful and reports having finished the content
    pub fn finished(&self) -> bool {
        self.response().is_some_and(|parsed| parsed.completed)
    }
}

//! Tolerant parser for tester responses
//!
//! Testers answer in a loosely structured template (see
//! [`response_template`](crate::prompt::response_template)). Models decorate
//! headers with markdown, inline values after a colon, reorder sections or
//! skip them entirely, so the grammar is line oriented:
//!
//! - a line is a *header* when its label (text before the first `:`, minus
//!   markdown decoration and list numbering) names a known section; text after
//!   the colon is the first body line of that section
//! - inside the bugs and confusion sections a list item is a header only
//!   when it is a bare section label; `- Completion: quest cannot be turned
//!   in` stays a bug
//! - every other line belongs to the most recent header; lines before the
//!   first header are only used by the fallback scans
//! - each field is read from its own section first, then from a
//!   keyword-anchored scan of the whole response, then defaults
//!
//! Parsing is total: any input, including garbage, yields a well-formed
//! [`ParsedResponse`].

use crate::types::{Bug, BugSeverity, Pacing, Recommendation};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rating used when a response carries no `N/10` marker
pub const DEFAULT_RATING: u8 = 5;

/// Highest rating on the scale
pub const MAX_RATING: u8 = 10;

static HEADER_DECORATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s#*_>•+\-]*(?:\d+[.)]\s*)?[\s*_]*").expect("header decoration regex")
});
static LABEL_QUALIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([^)]*\)\s*$").expect("label qualifier regex"));
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*+•]|\d+[.)])\s+").expect("list marker regex"));
static SEVERITY_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[\s*(minor|major|critical)\s*\]").expect("severity tag regex")
});
static RATING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*/\s*10\b").expect("rating regex"));
static DIFFICULTY_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)difficult\w*[^\n]*?(\d+(?:\.\d+)?)\s*/\s*10\b").expect("difficulty regex")
});
static ENGAGEMENT_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)engag\w*[^\n]*?(\d+(?:\.\d+)?)\s*/\s*10\b").expect("engagement regex")
});
static COMPLETION_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(yes|no|true|false|not|incomplete|unfinished|completed|finished)\b")
        .expect("completion word regex")
});
static COMPLETION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)complet\w*[^\n]*?\b(yes|no|true|false)\b").expect("completion marker regex")
});
static PACING_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(too[\s_-]*fast|just[\s_-]*right|too[\s_-]*slow)\b").expect("pacing regex")
});
static PACING_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)pac(?:ing|e)[^\n]*?\b(too[\s_-]*fast|just[\s_-]*right|too[\s_-]*slow)\b")
        .expect("pacing marker regex")
});
// "pass with changes" allows up to three words before "changes"
static RECOMMENDATION_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(pass[\s_-]*with[\s_-]*(?:[a-z]+[\s_-]+){0,3}?changes|fail(?:s|ed)?|pass(?:es|ed)?)\b",
    )
    .expect("recommendation regex")
});
static RECOMMENDATION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)recommend\w*[^\n]*?\b(pass[\s_-]*with[\s_-]*(?:[a-z]+[\s_-]+){0,3}?changes|fail(?:s|ed)?|pass(?:es|ed)?)\b",
    )
    .expect("recommendation marker regex")
});
/// Negation at most two words before a verdict, matched against the text preceding it
static NEGATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\b(?:not|never|cannot)|n't)\s+(?:[a-z]+\s+){0,2}$").expect("negation regex")
});

/// Named sections of the response template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Playthrough,
    Completion,
    Difficulty,
    Engagement,
    Pacing,
    Bugs,
    Confusion,
    Feedback,
    Recommendation,
}

impl Section {
    /// Template order
    pub const ALL: [Section; 9] = [
        Section::Playthrough,
        Section::Completion,
        Section::Difficulty,
        Section::Engagement,
        Section::Pacing,
        Section::Bugs,
        Section::Confusion,
        Section::Feedback,
        Section::Recommendation,
    ];

    /// Header text used in the template
    pub fn title(&self) -> &'static str {
        match self {
            Section::Playthrough => "Playthrough",
            Section::Completion => "Completion Status",
            Section::Difficulty => "Difficulty Rating",
            Section::Engagement => "Engagement Rating",
            Section::Pacing => "Pacing Assessment",
            Section::Bugs => "Bugs Found",
            Section::Confusion => "Confusion Points",
            Section::Feedback => "Overall Feedback",
            Section::Recommendation => "Recommendation",
        }
    }

    /// What the tester is asked to write under the header
    pub fn instructions(&self) -> &'static str {
        match self {
            Section::Playthrough => "Narrate your playthrough step by step, in character.",
            Section::Completion => "Completed: Yes or No",
            Section::Difficulty => "Difficulty: N/10 (0 = trivial, 10 = brutally hard)",
            Section::Engagement => "Engagement: N/10 (0 = bored, 10 = could not stop playing)",
            Section::Pacing => "Pacing: too_fast, just_right or too_slow",
            Section::Bugs => {
                "One bug per bullet, each tagged [MINOR], [MAJOR] or [CRITICAL]. Write 'None' if you found none."
            }
            Section::Confusion => "One bullet per moment you were confused. Write 'None' if nothing was unclear.",
            Section::Feedback => "Your overall impressions and suggestions.",
            Section::Recommendation => "Recommendation: pass, pass_with_changes or fail",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Section::Playthrough => &["playthrough", "playthrough narrative", "playthrough notes"],
            Section::Completion => &["completion status", "completion", "completed", "completed?"],
            Section::Difficulty => &["difficulty rating", "difficulty"],
            Section::Engagement => &["engagement rating", "engagement"],
            Section::Pacing => &["pacing assessment", "pacing"],
            Section::Bugs => &["bugs found", "bugs", "bug reports", "bugs/issues"],
            Section::Confusion => &["confusion points", "confusion", "confusing points"],
            Section::Feedback => &["overall feedback", "feedback"],
            Section::Recommendation => &["recommendation", "final recommendation"],
        }
    }

    fn from_label(label: &str) -> Option<Section> {
        let label = label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        Section::ALL
            .into_iter()
            .find(|section| section.aliases().contains(&label.as_str()))
    }
}

/// Structured form of one tester response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResponse {
    pub playthrough: String,
    pub completed: bool,
    pub difficulty: u8,
    pub engagement: u8,
    pub pacing: Pacing,
    pub bugs: Vec<Bug>,
    pub confusion_points: Vec<String>,
    pub feedback: String,
    pub recommendation: Recommendation,
}

impl Default for ParsedResponse {
    fn default() -> Self {
        Self {
            playthrough: String::new(),
            completed: false,
            difficulty: DEFAULT_RATING,
            engagement: DEFAULT_RATING,
            pacing: Pacing::Unknown,
            bugs: Vec::new(),
            confusion_points: Vec::new(),
            feedback: String::new(),
            recommendation: Recommendation::PassWithChanges,
        }
    }
}

/// Parse a raw model response. Never fails.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let sections = split_sections(raw);

    ParsedResponse {
        playthrough: section_text(&sections, Section::Playthrough),
        completed: parse_completion(&sections, raw),
        difficulty: parse_rating(&sections, Section::Difficulty, &DIFFICULTY_MARKER, raw),
        engagement: parse_rating(&sections, Section::Engagement, &ENGAGEMENT_MARKER, raw),
        pacing: parse_pacing(&sections, raw),
        bugs: parse_bugs(&sections, raw),
        confusion_points: sections
            .get(&Section::Confusion)
            .map(|lines| list_items(lines))
            .unwrap_or_default(),
        feedback: section_text(&sections, Section::Feedback),
        recommendation: parse_recommendation(&sections, raw),
    }
}

type SectionBodies = HashMap<Section, Vec<String>>;

/// Recognize a header line, returning the section and any inline value
fn parse_header(line: &str) -> Option<(Section, &str)> {
    let start = HEADER_DECORATION.find(line).map_or(0, |m| m.end());
    let stripped = &line[start..];

    let (label, rest) = stripped.split_once(':').unwrap_or((stripped, ""));
    let label = label.trim().trim_end_matches(['*', '_', '#']).trim();
    let label = LABEL_QUALIFIER.replace(label, "");
    let section = Section::from_label(&label)?;

    let rest = rest.trim().trim_start_matches(['*', '_']).trim();
    Some((section, rest))
}

fn split_sections(raw: &str) -> SectionBodies {
    let mut sections = SectionBodies::new();
    let mut current: Option<Section> = None;

    for line in raw.lines() {
        if let Some(section) = current.filter(|s| is_list_section(*s) && is_list_item(line)) {
            sections.entry(section).or_default().push(line.trim_end().to_string());
            continue;
        }

        if let Some((section, inline)) = parse_header(line) {
            let body = sections.entry(section).or_default();
            if !inline.is_empty() {
                body.push(inline.to_string());
            }
            current = Some(section);
        } else if let Some(section) = current {
            sections.entry(section).or_default().push(line.trim_end().to_string());
        }
    }

    sections
}

fn is_list_section(section: Section) -> bool {
    matches!(section, Section::Bugs | Section::Confusion)
}

/// A list item that is not a bare section label such as `- Confusion Points`
fn is_list_item(line: &str) -> bool {
    LIST_MARKER.is_match(line) && !matches!(parse_header(line), Some((_, inline)) if inline.is_empty())
}

fn section_text(sections: &SectionBodies, section: Section) -> String {
    sections
        .get(&section)
        .map(|lines| {
            lines
                .iter()
                .map(|l| l.trim())
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

fn parse_completion(sections: &SectionBodies, raw: &str) -> bool {
    let in_section = sections.get(&Section::Completion).and_then(|lines| {
        lines.iter().find_map(|line| {
            COMPLETION_WORD.captures(line).map(|c| {
                matches!(
                    c[1].to_lowercase().as_str(),
                    "yes" | "true" | "completed" | "finished"
                )
            })
        })
    });

    in_section
        .or_else(|| {
            COMPLETION_MARKER
                .captures(raw)
                .map(|c| matches!(c[1].to_lowercase().as_str(), "yes" | "true"))
        })
        .unwrap_or(false)
}

fn clamp_rating(value: &str) -> Option<u8> {
    let value: f64 = value.parse().ok()?;
    Some(value.round().clamp(0.0, f64::from(MAX_RATING)) as u8)
}

fn parse_rating(sections: &SectionBodies, section: Section, marker: &Regex, raw: &str) -> u8 {
    let in_section = sections.get(&section).and_then(|lines| {
        lines
            .iter()
            .find_map(|line| RATING.captures(line).and_then(|c| clamp_rating(&c[1])))
    });

    in_section
        .or_else(|| marker.captures(raw).and_then(|c| clamp_rating(&c[1])))
        .unwrap_or(DEFAULT_RATING)
}

fn pacing_from(token: &str) -> Pacing {
    let token = token.to_lowercase();
    if token.ends_with("fast") {
        Pacing::TooFast
    } else if token.ends_with("slow") {
        Pacing::TooSlow
    } else {
        Pacing::JustRight
    }
}

fn parse_pacing(sections: &SectionBodies, raw: &str) -> Pacing {
    let in_section = sections.get(&Section::Pacing).and_then(|lines| {
        lines
            .iter()
            .find_map(|line| PACING_VALUE.captures(line).map(|c| pacing_from(&c[1])))
    });

    in_section
        .or_else(|| PACING_MARKER.captures(raw).map(|c| pacing_from(&c[1])))
        .unwrap_or(Pacing::Unknown)
}

fn recommendation_from(token: &str) -> Recommendation {
    let token = token.to_lowercase();
    if token.contains("with") {
        Recommendation::PassWithChanges
    } else if token.starts_with("fail") {
        Recommendation::Fail
    } else {
        Recommendation::Pass
    }
}

/// First verdict in `text`, flipped when the words just before it negate it.
/// "not pass" is a fail and "not fail" lands on the cautious middle.
fn find_recommendation(pattern: &Regex, text: &str) -> Option<Recommendation> {
    let token = pattern.captures(text)?.get(1)?;
    let line_start = text[..token.start()].rfind('\n').map_or(0, |i| i + 1);
    let recommendation = recommendation_from(token.as_str());

    if !NEGATION.is_match(&text[line_start..token.start()]) {
        return Some(recommendation);
    }
    Some(match recommendation {
        Recommendation::Fail => Recommendation::PassWithChanges,
        Recommendation::Pass | Recommendation::PassWithChanges => Recommendation::Fail,
    })
}

fn parse_recommendation(sections: &SectionBodies, raw: &str) -> Recommendation {
    let in_section = sections.get(&Section::Recommendation).and_then(|lines| {
        lines
            .iter()
            .find_map(|line| find_recommendation(&RECOMMENDATION_VALUE, line))
    });

    in_section
        .or_else(|| find_recommendation(&RECOMMENDATION_MARKER, raw))
        .unwrap_or_default()
}

/// Items that mean "nothing to report"
fn is_empty_marker(item: &str) -> bool {
    let item = item
        .trim()
        .trim_end_matches(['.', '!'])
        .trim()
        .to_lowercase();

    matches!(
        item.as_str(),
        "none" | "n/a" | "na" | "nothing" | "-" | "none found" | "none noted" | "none observed"
    ) || item.starts_with("no bugs")
        || item.starts_with("no confusion")
        || item.starts_with("none ")
}

/// Extract list items; plain lines count when the block has no list markers
fn list_items(lines: &[String]) -> Vec<String> {
    let has_markers = lines.iter().any(|line| LIST_MARKER.is_match(line));

    lines
        .iter()
        .filter_map(|line| {
            if let Some(marker) = LIST_MARKER.find(line) {
                Some(line[marker.end()..].trim().to_string())
            } else if !has_markers {
                Some(line.trim().to_string())
            } else {
                None
            }
        })
        .filter(|item| !item.is_empty() && !is_empty_marker(item))
        .collect()
}

fn bug_from_item(item: &str) -> Option<Bug> {
    let severity = SEVERITY_TAG
        .captures(item)
        .and_then(|c| c[1].parse::<BugSeverity>().ok())
        .unwrap_or_default();

    let description = SEVERITY_TAG.replace_all(item, " ");
    let description = description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let description = description.trim_matches(|c: char| c == '-' || c == ':' || c.is_whitespace());

    if description.is_empty() || is_empty_marker(description) {
        return None;
    }
    Some(Bug::new(description, severity))
}

fn parse_bugs(sections: &SectionBodies, raw: &str) -> Vec<Bug> {
    match sections.get(&Section::Bugs) {
        Some(lines) => list_items(lines)
            .iter()
            .filter_map(|item| bug_from_item(item))
            .collect(),
        // No bugs section: accept tagged list items anywhere
        None => raw
            .lines()
            .filter(|line| LIST_MARKER.is_match(line) && SEVERITY_TAG.is_match(line))
            .filter_map(|line| {
                let start = LIST_MARKER.find(line).map_or(0, |m| m.end());
                bug_from_item(&line[start..])
            })
            .collect(),
    }
}

//! Prompt construction for a single tester

use crate::{
    parser::Section,
    types::{ContentUnderTest, TesterConfig},
};

/// Build the full playtest prompt for `tester` against `content`.
///
/// The prompt ends with the response template whose section headers are the
/// ones [`parse_response`](crate::parser::parse_response) understands.
pub fn build_prompt(tester: &TesterConfig, content: &ContentUnderTest) -> String {
    let mut lines = vec![
        format!(
            "You are {} (tester id: {}), a virtual playtester for a video game.",
            tester.name, tester.id
        ),
        format!("Archetype: {} - {}", tester.archetype, tester.archetype.play_style()),
        format!(
            "Knowledge level: {} - you are {}.",
            tester.knowledge_level,
            tester.knowledge_level.description()
        ),
    ];
    if !tester.personality.trim().is_empty() {
        lines.push(format!("Personality: {}", tester.personality.trim()));
    }
    if !tester.expectations.is_empty() {
        lines.push("Your expectations, most important first:".to_string());
        lines.extend(
            tester
                .expectations
                .iter()
                .enumerate()
                .map(|(i, expectation)| format!("{}. {}", i + 1, expectation)),
        );
    }

    lines.push(String::new());
    lines.push(format!(
        "Play through the following {} and report honestly, in character.",
        content.content_type
    ));
    lines.push(format!("Content type: {}", content.content_type));
    lines.push(format!("Name: {}", content.name));
    if !content.description.trim().is_empty() {
        lines.push(format!("Description: {}", content.description.trim()));
    }
    if !content.payload.is_null() {
        let payload = serde_json::to_string_pretty(&content.payload)
            .unwrap_or_else(|_| content.payload.to_string());
        lines.push(format!("Content data:\n{payload}"));
    }

    lines.push(String::new());
    lines.push(response_template());
    lines.join("\n")
}

/// The response format testers are asked to follow
pub fn response_template() -> String {
    let mut template = String::from("Respond using exactly these sections:\n\n");
    for section in Section::ALL {
        template.push_str(&format!("## {}\n{}\n\n", section.title(), section.instructions()));
    }
    template
}

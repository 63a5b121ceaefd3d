//! Ready-made tester personas

use crate::types::{Archetype, KnowledgeLevel, TesterConfig};

struct Persona {
    name: &'static str,
    personality: &'static str,
    expectations: &'static [&'static str],
}

fn persona(archetype: Archetype) -> Persona {
    match archetype {
        Archetype::Completionist => Persona {
            name: "Ada",
            personality: "Methodical and patient, keeps a checklist of everything left to find",
            expectations: &[
                "Every objective can be completed",
                "Optional content is worth the effort",
                "Progress tracking is accurate",
            ],
        },
        Archetype::Speedrunner => Persona {
            name: "Dash",
            personality: "Impatient and competitive, skips every cutscene",
            expectations: &[
                "Movement and menus stay out of the way",
                "Unskippable sequences are rare",
                "Clever routing is rewarded",
            ],
        },
        Archetype::Explorer => Persona {
            name: "Wren",
            personality: "Curious and easily distracted by anything off the beaten path",
            expectations: &[
                "Hidden areas reward curiosity",
                "The world reacts to off-path actions",
            ],
        },
        Archetype::Casual => Persona {
            name: "Sam",
            personality: "Relaxed evening player who dislikes grinding",
            expectations: &[
                "Objectives are always clear",
                "Sessions can end at any point without losing progress",
            ],
        },
        Archetype::Minmaxer => Persona {
            name: "Vex",
            personality: "Analytical, runs numbers on every reward and build choice",
            expectations: &[
                "Rewards scale sensibly with effort",
                "There is no single dominant strategy",
            ],
        },
        Archetype::Roleplayer => Persona {
            name: "Mira",
            personality: "Immersive storyteller who stays in character",
            expectations: &[
                "Characters act consistently",
                "Dialogue choices have consequences",
                "Tone matches the setting",
            ],
        },
        Archetype::Breaker => Persona {
            name: "Glitch",
            personality: "Mischievous and relentless, tries the one thing nobody planned for",
            expectations: &[
                "Invalid inputs are handled gracefully",
                "Sequence breaks do not soft-lock progress",
            ],
        },
    }
}

fn default_level(archetype: Archetype) -> KnowledgeLevel {
    match archetype {
        Archetype::Completionist | Archetype::Speedrunner | Archetype::Minmaxer => KnowledgeLevel::Expert,
        Archetype::Explorer | Archetype::Breaker => KnowledgeLevel::Intermediate,
        Archetype::Casual | Archetype::Roleplayer => KnowledgeLevel::Beginner,
    }
}

/// Build a preset tester for `archetype` at `knowledge_level`.
///
/// The ID is `<archetype>-<knowledge_level>`, so one preset per pairing can
/// be registered at a time.
pub fn tester_for(archetype: Archetype, knowledge_level: KnowledgeLevel) -> TesterConfig {
    let persona = persona(archetype);
    TesterConfig::new(
        format!("{archetype}-{knowledge_level}"),
        persona.name,
        archetype,
        knowledge_level,
    )
    .with_personality(persona.personality)
    .with_expectations(persona.expectations.iter().copied())
}

/// One tester per archetype with a spread of knowledge levels
pub fn default_roster() -> Vec<TesterConfig> {
    Archetype::ALL
        .iter()
        .map(|&archetype| tester_for(archetype, default_level(archetype)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_roster_covers_every_archetype() {
        let roster = default_roster();
        assert_eq!(roster.len(), Archetype::ALL.len());

        let archetypes: HashSet<_> = roster.iter().map(|t| t.archetype).collect();
        assert_eq!(archetypes.len(), Archetype::ALL.len());

        let ids: HashSet<_> = roster.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), roster.len());

        let levels: HashSet<_> = roster.iter().map(|t| t.knowledge_level).collect();
        assert_eq!(levels.len(), 3);
        assert!(roster.iter().all(|t| !t.expectations.is_empty()));
    }

    #[test]
    fn test_tester_for() {
        let tester = tester_for(Archetype::Breaker, KnowledgeLevel::Expert);
        assert_eq!(tester.id, "breaker-expert");
        assert_eq!(tester.name, "Glitch");
        assert_eq!(tester.knowledge_level, KnowledgeLevel::Expert);
    }
}

/// Story structure templates and per-beat scene writing.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::outline::{Analysis, Beat, Complexity, Genre, SceneType};

/// One slot of a story template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSlot {
    pub tag: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

impl TemplateSlot {
    pub fn scene_type(&self) -> SceneType {
        SceneType::from(self.tag)
    }
}

const THREE_ACT: [TemplateSlot; 5] = [
    TemplateSlot {
        tag: "setup",
        title: "Setup & Introduction",
        description: "Introduce the world and main character",
    },
    TemplateSlot {
        tag: "inciting",
        title: "Inciting Incident",
        description: "The event that starts the adventure",
    },
    TemplateSlot {
        tag: "rising",
        title: "Rising Action",
        description: "Challenges and obstacles arise",
    },
    TemplateSlot {
        tag: "climax",
        title: "Climax",
        description: "The main confrontation or turning point",
    },
    TemplateSlot {
        tag: "resolution",
        title: "Resolution",
        description: "Conclusion and new normal",
    },
];

const HERO_JOURNEY: [TemplateSlot; 5] = [
    TemplateSlot {
        tag: "ordinary",
        title: "Ordinary World",
        description: "Character in their normal environment",
    },
    TemplateSlot {
        tag: "call",
        title: "Call to Adventure",
        description: "The quest begins",
    },
    TemplateSlot {
        tag: "trials",
        title: "Trials & Tribulations",
        description: "Facing challenges and learning",
    },
    TemplateSlot {
        tag: "revelation",
        title: "Revelation",
        description: "Character discovers their true power",
    },
    TemplateSlot {
        tag: "return",
        title: "Return Transformed",
        description: "Character returns changed",
    },
];

const SIMPLE: [TemplateSlot; 3] = [
    TemplateSlot {
        tag: "beginning",
        title: "Beginning",
        description: "How it all starts",
    },
    TemplateSlot {
        tag: "middle",
        title: "Middle",
        description: "What happens next",
    },
    TemplateSlot {
        tag: "end",
        title: "End",
        description: "How it concludes",
    },
];

/// The three story structures outlines are generated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoryTemplate {
    ThreeAct,
    HeroJourney,
    Simple,
}

impl StoryTemplate {
    pub const ALL: [StoryTemplate; 3] = [Self::ThreeAct, Self::HeroJourney, Self::Simple];

    /// Lookup key, as used by template pickers ("threeAct", ...).
    pub fn key(&self) -> &'static str {
        match self {
            Self::ThreeAct => "threeAct",
            Self::HeroJourney => "heroJourney",
            Self::Simple => "simple",
        }
    }

    /// Human-readable name stored on generated outlines.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ThreeAct => "Three Act Structure",
            Self::HeroJourney => "Hero's Journey",
            Self::Simple => "Simple Story",
        }
    }

    pub fn slots(&self) -> &'static [TemplateSlot] {
        match self {
            Self::ThreeAct => &THREE_ACT,
            Self::HeroJourney => &HERO_JOURNEY,
            Self::Simple => &SIMPLE,
        }
    }

    pub fn from_key(key: &str) -> Option<StoryTemplate> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }

    /// Pick a template for an analyzed logline.
    pub fn select(analysis: &Analysis) -> StoryTemplate {
        if analysis.complexity == Complexity::Simple {
            return Self::Simple;
        }
        match analysis.genre {
            Genre::Adventure | Genre::Fantasy => Self::HeroJourney,
            _ => Self::ThreeAct,
        }
    }
}

impl fmt::Display for StoryTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Title, body and image prompt written for one scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneText {
    pub title: String,
    pub content: String,
    pub visual_prompt: String,
}

/// Write the text of the scene filling `slot` at zero-based `index`.
pub fn write_scene(
    slot: &TemplateSlot,
    index: usize,
    character: &str,
    action: &str,
    setting: &str,
) -> SceneText {
    let Some(beat) = slot.scene_type().beat() else {
        return SceneText {
            title: slot.title.to_string(),
            content: format!("Scene {}: {} continues their journey.", index + 1, character),
            visual_prompt: format!("{} in {}", character, setting),
        };
    };

    match beat {
        Beat::Opening => SceneText {
            title: format!("Meet {}", character),
            content: format!(
                "We meet {} in their everyday world. Everything seems normal, but something is about to change.",
                character
            ),
            visual_prompt: format!(
                "{} in {}, looking contemplative, everyday scene",
                character, setting
            ),
        },
        Beat::Inciting => SceneText {
            title: "The Adventure Begins".to_string(),
            content: format!(
                "{} discovers an opportunity to {}. This is the moment that changes everything.",
                character, action
            ),
            visual_prompt: format!(
                "{} discovering something exciting, moment of realization",
                character
            ),
        },
        Beat::Rising => SceneText {
            title: "Challenges Arise".to_string(),
            content: format!(
                "{} faces obstacles while trying to {}. Things don't go as planned.",
                character, action
            ),
            visual_prompt: format!(
                "{} facing difficulties, dramatic lighting, tension",
                character
            ),
        },
        Beat::Climax => SceneText {
            title: "The Big Moment".to_string(),
            content: format!(
                "This is the most important moment. {} must use everything they've learned.",
                character
            ),
            visual_prompt: format!("{} in action, dramatic scene, high energy", character),
        },
        Beat::Resolution => SceneText {
            title: "New Beginning".to_string(),
            content: format!(
                "{} succeeds in their goal to {}. Life is different now, but in a good way.",
                character, action
            ),
            visual_prompt: format!(
                "{} satisfied and changed, peaceful scene, resolution",
                character
            ),
        },
    }
}

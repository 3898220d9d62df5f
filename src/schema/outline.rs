use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad category a story's main character falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterKind {
    Animal,
    Person,
    Fantasy,
    Robot,
    Profession,
}

impl CharacterKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Animal => "animal",
            Self::Person => "person",
            Self::Fantasy => "fantasy",
            Self::Robot => "robot",
            Self::Profession => "profession",
        }
    }
}

/// Genre inferred from a logline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Genre {
    SciFi,
    Fantasy,
    Mystery,
    Adventure,
    SliceOfLife,
}

impl Genre {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SciFi => "sci-fi",
            Self::Fantasy => "fantasy",
            Self::Mystery => "mystery",
            Self::Adventure => "adventure",
            Self::SliceOfLife => "slice-of-life",
        }
    }
}

/// How much story a logline carries; drives template selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

/// The main character extracted from a logline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    #[serde(rename = "type")]
    pub kind: CharacterKind,
    pub name: String,
}

/// Everything the generator learned from a logline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub character: Character,
    pub action: String,
    pub setting: Vec<String>,
    pub genre: Genre,
    pub complexity: Complexity,
    pub keywords: Vec<String>,
}

impl Analysis {
    /// The first matched setting, which is the one scenes and scripts use.
    pub fn primary_setting(&self) -> Option<&str> {
        self.setting.first().map(String::as_str)
    }
}

/// A structural beat shared by several scene types.
///
/// The three templates name their slots differently ("setup" vs "ordinary"
/// vs "beginning"); content generation only cares about the beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Beat {
    Opening,
    Inciting,
    Rising,
    Climax,
    Resolution,
}

/// Scene type tag carried by every generated scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SceneType {
    Setup,
    Inciting,
    Rising,
    Climax,
    Resolution,
    Ordinary,
    Call,
    Trials,
    Revelation,
    Return,
    Beginning,
    Middle,
    End,
    /// Any other tag, including "custom" for manually added scenes.
    Custom(String),
}

impl SceneType {
    pub fn name(&self) -> &str {
        match self {
            Self::Setup => "setup",
            Self::Inciting => "inciting",
            Self::Rising => "rising",
            Self::Climax => "climax",
            Self::Resolution => "resolution",
            Self::Ordinary => "ordinary",
            Self::Call => "call",
            Self::Trials => "trials",
            Self::Revelation => "revelation",
            Self::Return => "return",
            Self::Beginning => "beginning",
            Self::Middle => "middle",
            Self::End => "end",
            Self::Custom(tag) => tag,
        }
    }

    /// Beat used to write scene content. Every built-in type has one.
    pub fn beat(&self) -> Option<Beat> {
        match self {
            Self::Setup | Self::Ordinary | Self::Beginning => Some(Beat::Opening),
            Self::Inciting | Self::Call => Some(Beat::Inciting),
            Self::Rising | Self::Trials | Self::Middle => Some(Beat::Rising),
            Self::Climax | Self::Revelation => Some(Beat::Climax),
            Self::Resolution | Self::Return | Self::End => Some(Beat::Resolution),
            Self::Custom(_) => None,
        }
    }

    /// Beat used to pick a line of dialogue in the script.
    ///
    /// Narrower than [`SceneType::beat`]: the simple template's
    /// beginning/middle/end slots get no dialogue.
    pub fn dialogue_beat(&self) -> Option<Beat> {
        match self {
            Self::Setup | Self::Ordinary => Some(Beat::Opening),
            Self::Inciting | Self::Call => Some(Beat::Inciting),
            Self::Rising | Self::Trials => Some(Beat::Rising),
            Self::Climax | Self::Revelation => Some(Beat::Climax),
            Self::Resolution | Self::Return => Some(Beat::Resolution),
            _ => None,
        }
    }
}

impl From<String> for SceneType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "setup" => Self::Setup,
            "inciting" => Self::Inciting,
            "rising" => Self::Rising,
            "climax" => Self::Climax,
            "resolution" => Self::Resolution,
            "ordinary" => Self::Ordinary,
            "call" => Self::Call,
            "trials" => Self::Trials,
            "revelation" => Self::Revelation,
            "return" => Self::Return,
            "beginning" => Self::Beginning,
            "middle" => Self::Middle,
            "end" => Self::End,
            _ => Self::Custom(tag),
        }
    }
}

impl From<&str> for SceneType {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<SceneType> for String {
    fn from(scene_type: SceneType) -> Self {
        match scene_type {
            SceneType::Custom(tag) => tag,
            other => other.name().to_string(),
        }
    }
}

impl fmt::Display for SceneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One narrative beat of an outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub visual_prompt: String,
    pub editable: bool,
    /// Absent on the blank outline a new project starts with.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub scene_type: Option<SceneType>,
}

impl Scene {
    /// Overwrite every field the patch carries.
    pub fn apply(&mut self, patch: ScenePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(visual_prompt) = patch.visual_prompt {
            self.visual_prompt = visual_prompt;
        }
        if let Some(editable) = patch.editable {
            self.editable = editable;
        }
        if let Some(scene_type) = patch.scene_type {
            self.scene_type = Some(scene_type);
        }
    }
}

/// A partial scene update. The id is deliberately not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub visual_prompt: Option<String>,
    #[serde(default)]
    pub editable: Option<bool>,
    #[serde(rename = "type", default)]
    pub scene_type: Option<SceneType>,
}

impl ScenePatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

/// An ordered list of scenes generated from a logline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outline {
    pub logline: String,
    /// Display name of the template the scenes were generated against.
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    pub scenes: Vec<Scene>,
    pub generated_at: DateTime<Utc>,
}

impl Outline {
    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    pub fn scene_mut(&mut self, id: &str) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|s| s.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.scenes.iter().position(|s| s.id == id)
    }

    pub fn scene_ids(&self) -> Vec<&str> {
        self.scenes.iter().map(|s| s.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_scene(id: &str, scene_type: Option<SceneType>) -> Scene {
        Scene {
            id: id.to_string(),
            title: "Meet fox".to_string(),
            description: "Introduce the world and main character".to_string(),
            content: "We meet fox.".to_string(),
            visual_prompt: "fox in forest".to_string(),
            editable: true,
            scene_type,
        }
    }

    #[test]
    fn scene_type_tags() {
        assert_eq!(SceneType::from("setup"), SceneType::Setup);
        assert_eq!(SceneType::from("return"), SceneType::Return);
        assert_eq!(
            SceneType::from("custom"),
            SceneType::Custom("custom".to_string())
        );
        assert_eq!(String::from(SceneType::Trials), "trials");
        assert_eq!(SceneType::Custom("flashback".to_string()).name(), "flashback");
    }

    #[test]
    fn beat_aliases() {
        assert_eq!(SceneType::Ordinary.beat(), Some(Beat::Opening));
        assert_eq!(SceneType::Beginning.beat(), Some(Beat::Opening));
        assert_eq!(SceneType::Middle.beat(), Some(Beat::Rising));
        assert_eq!(SceneType::End.beat(), Some(Beat::Resolution));
        assert_eq!(SceneType::Custom("custom".to_string()).beat(), None);
    }

    #[test]
    fn dialogue_beat_skips_simple_slots() {
        assert_eq!(SceneType::Call.dialogue_beat(), Some(Beat::Inciting));
        assert_eq!(SceneType::Revelation.dialogue_beat(), Some(Beat::Climax));
        assert_eq!(SceneType::Beginning.dialogue_beat(), None);
        assert_eq!(SceneType::Middle.dialogue_beat(), None);
        assert_eq!(SceneType::End.dialogue_beat(), None);
    }

    #[test]
    fn scene_json_field_names() {
        let scene = make_scene("scene_1", Some(SceneType::Setup));
        let json = serde_json::to_value(&scene).unwrap();
        assert_eq!(json["visualPrompt"], "fox in forest");
        assert_eq!(json["type"], "setup");
        assert_eq!(json["editable"], true);
    }

    #[test]
    fn untyped_scene_omits_type() {
        let scene = make_scene("scene_1", None);
        let json = serde_json::to_value(&scene).unwrap();
        assert!(json.get("type").is_none());
    }

    #[test]
    fn genre_serializes_kebab_case() {
        assert_eq!(serde_json::to_value(Genre::SciFi).unwrap(), "sci-fi");
        assert_eq!(
            serde_json::to_value(Genre::SliceOfLife).unwrap(),
            "slice-of-life"
        );
        assert_eq!(Genre::SliceOfLife.name(), "slice-of-life");
    }

    #[test]
    fn character_type_key() {
        let character = Character {
            kind: CharacterKind::Robot,
            name: "robot".to_string(),
        };
        let json = serde_json::to_value(&character).unwrap();
        assert_eq!(json["type"], "robot");
        assert_eq!(json["name"], "robot");
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut scene = make_scene("scene_1", Some(SceneType::Setup));
        scene.apply(ScenePatch {
            title: Some("Dawn".to_string()),
            editable: Some(false),
            ..ScenePatch::default()
        });
        assert_eq!(scene.title, "Dawn");
        assert!(!scene.editable);
        assert_eq!(scene.content, "We meet fox.");
        assert_eq!(scene.scene_type, Some(SceneType::Setup));
    }

    #[test]
    fn patch_from_camel_case_json() {
        let patch: ScenePatch =
            serde_json::from_str(r#"{"visualPrompt": "fox at dusk", "type": "climax"}"#).unwrap();
        assert_eq!(patch.visual_prompt.as_deref(), Some("fox at dusk"));
        assert_eq!(patch.scene_type, Some(SceneType::Climax));
        assert!(patch.title.is_none());
    }

    #[test]
    fn outline_lookup() {
        let outline = Outline {
            logline: "A fox in a forest".to_string(),
            template: "Simple Story".to_string(),
            analysis: None,
            scenes: vec![
                make_scene("scene_1", Some(SceneType::Beginning)),
                make_scene("scene_2", Some(SceneType::Middle)),
            ],
            generated_at: Utc::now(),
        };
        assert_eq!(outline.position("scene_2"), Some(1));
        assert!(outline.scene("scene_9").is_none());
        assert_eq!(outline.scene_ids(), vec!["scene_1", "scene_2"]);
    }
}

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use super::outline::{Outline, Scene};

/// Wizard step a project was last left on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WizardStep {
    Idea = 1,
    Script = 2,
    Visuals = 3,
    Cuts = 4,
}

impl WizardStep {
    pub const LAST: WizardStep = WizardStep::Cuts;

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn next(&self) -> Option<WizardStep> {
        WizardStep::try_from(self.number() + 1).ok()
    }

    pub fn previous(&self) -> Option<WizardStep> {
        WizardStep::try_from(self.number().checked_sub(1)?).ok()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idea => "Idea",
            Self::Script => "Script",
            Self::Visuals => "Visuals",
            Self::Cuts => "Cuts",
        }
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::Idea
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Idea),
            2 => Ok(Self::Script),
            3 => Ok(Self::Visuals),
            4 => Ok(Self::Cuts),
            other => Err(format!("wizard step out of range: {}", other)),
        }
    }
}

impl From<WizardStep> for u8 {
    fn from(step: WizardStep) -> Self {
        step.number()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Completed,
}

impl ProjectStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Completed => "Completed",
        }
    }
}

/// Screenplay text rendered for one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptScene {
    pub scene_id: String,
    pub title: String,
    pub script: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSettings {
    pub enabled: bool,
    /// Last rendered script, refreshed whenever the outline changes.
    #[serde(default)]
    pub scenes: Vec<ScriptScene>,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            scenes: Vec::new(),
        }
    }
}

/// Scene ordering and per-scene durations (seconds) for the cuts step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cuts {
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(default)]
    pub durations: FxHashMap<String, f32>,
}

/// One image candidate produced for a visual scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub url: String,
    pub prompt: String,
    pub generated_at: DateTime<Utc>,
}

/// Which style applies to a visual scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleStatus {
    Custom,
    Global,
    Unstyled,
}

impl StyleStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Custom => "Custom Style",
            Self::Global => "Global Style",
            Self::Unstyled => "No Style",
        }
    }
}

/// A scene as seen by the visuals step: a prompt plus image selection state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualScene {
    pub id: String,
    pub scene_number: usize,
    pub title: String,
    pub prompt: String,
    #[serde(default)]
    pub global_style: Option<String>,
    #[serde(default)]
    pub custom_style: Option<String>,
    #[serde(default)]
    pub selected_image: Option<String>,
    #[serde(default)]
    pub generated_images: Vec<GeneratedImage>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl VisualScene {
    /// Snapshot an outline scene. `index` is zero-based.
    pub fn from_scene(scene: &Scene, index: usize) -> Self {
        let prompt = if scene.visual_prompt.is_empty() {
            scene.content.clone()
        } else {
            scene.visual_prompt.clone()
        };
        Self {
            id: scene.id.clone(),
            scene_number: index + 1,
            title: scene.title.clone(),
            prompt,
            global_style: None,
            custom_style: None,
            selected_image: None,
            generated_images: Vec::new(),
            image_url: None,
        }
    }

    pub fn style_status(&self, global_style_locked: bool) -> StyleStatus {
        if self.custom_style.is_some() {
            StyleStatus::Custom
        } else if self.global_style.is_some() || global_style_locked {
            StyleStatus::Global
        } else {
            StyleStatus::Unstyled
        }
    }

    /// Number of filled image slots, counting a pasted URL once.
    pub fn image_count(&self) -> usize {
        let pasted = match &self.image_url {
            Some(url) if !self.generated_images.iter().any(|img| &img.url == url) => 1,
            _ => 0,
        };
        self.generated_images.len() + pasted
    }
}

/// A story project as persisted in the project collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub logline: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub step: WizardStep,
    /// Older documents store `[]` here until an outline is generated.
    #[serde(default, deserialize_with = "outline_or_placeholder")]
    pub outline: Option<Outline>,
    #[serde(default)]
    pub script: ScriptSettings,
    /// Created the first time the visuals step is opened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_scenes: Option<Vec<VisualScene>>,
    #[serde(default)]
    pub cuts: Cuts,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_steps: Vec<WizardStep>,
    #[serde(default)]
    pub global_style_locked: bool,
    #[serde(default)]
    pub status: ProjectStatus,
}

/// Reads an outline, treating `null` and an empty-array placeholder as absent.
fn outline_or_placeholder<'de, D>(deserializer: D) -> Result<Option<Outline>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StoredOutline {
        Outline(Outline),
        Placeholder(Vec<IgnoredAny>),
    }

    Ok(match Option::<StoredOutline>::deserialize(deserializer)? {
        Some(StoredOutline::Outline(outline)) => Some(outline),
        Some(StoredOutline::Placeholder(_)) | None => None,
    })
}

impl Project {
    pub fn scene_count(&self) -> usize {
        self.outline.as_ref().map_or(0, |o| o.scenes.len())
    }

    pub fn visual_scene_mut(&mut self, id: &str) -> Option<&mut VisualScene> {
        self.visual_scenes
            .as_mut()?
            .iter_mut()
            .find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::outline::SceneType;

    fn make_scene() -> Scene {
        Scene {
            id: "scene_1".to_string(),
            title: "Meet robot".to_string(),
            description: "How it all starts".to_string(),
            content: "We meet robot in their everyday world.".to_string(),
            visual_prompt: "robot in an interesting place".to_string(),
            editable: true,
            scene_type: Some(SceneType::Beginning),
        }
    }

    #[test]
    fn wizard_step_navigation() {
        assert_eq!(WizardStep::Idea.next(), Some(WizardStep::Script));
        assert_eq!(WizardStep::Cuts.next(), None);
        assert_eq!(WizardStep::Idea.previous(), None);
        assert_eq!(WizardStep::Visuals.previous(), Some(WizardStep::Script));
    }

    #[test]
    fn wizard_step_serializes_as_number() {
        assert_eq!(serde_json::to_value(WizardStep::Visuals).unwrap(), 3);
        let step: WizardStep = serde_json::from_str("2").unwrap();
        assert_eq!(step, WizardStep::Script);
        assert!(serde_json::from_str::<WizardStep>("7").is_err());
    }

    #[test]
    fn visual_scene_prefers_visual_prompt() {
        let visual = VisualScene::from_scene(&make_scene(), 0);
        assert_eq!(visual.scene_number, 1);
        assert_eq!(visual.prompt, "robot in an interesting place");
    }

    #[test]
    fn visual_scene_falls_back_to_content() {
        let mut scene = make_scene();
        scene.visual_prompt.clear();
        let visual = VisualScene::from_scene(&scene, 2);
        assert_eq!(visual.scene_number, 3);
        assert_eq!(visual.prompt, "We meet robot in their everyday world.");
    }

    #[test]
    fn style_status_precedence() {
        let mut visual = VisualScene::from_scene(&make_scene(), 0);
        assert_eq!(visual.style_status(false), StyleStatus::Unstyled);
        assert_eq!(visual.style_status(true), StyleStatus::Global);
        visual.custom_style = Some("watercolor".to_string());
        assert_eq!(visual.style_status(true), StyleStatus::Custom);
        assert_eq!(StyleStatus::Custom.label(), "Custom Style");
    }

    #[test]
    fn image_count_dedupes_pasted_url() {
        let mut visual = VisualScene::from_scene(&make_scene(), 0);
        visual.generated_images.push(GeneratedImage {
            url: "https://example.com/a.png".to_string(),
            prompt: "p".to_string(),
            generated_at: Utc::now(),
        });
        visual.image_url = Some("https://example.com/a.png".to_string());
        assert_eq!(visual.image_count(), 1);
        visual.image_url = Some("https://example.com/b.png".to_string());
        assert_eq!(visual.image_count(), 2);
    }

    #[test]
    fn project_tolerates_missing_optional_fields() {
        let json = r#"{
            "id": "story_1_abc",
            "title": "A cat",
            "logline": "A cat",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.step, WizardStep::Idea);
        assert!(project.outline.is_none());
        assert!(project.script.enabled);
        assert!(project.visual_scenes.is_none());
        assert_eq!(project.status, ProjectStatus::Draft);
        assert_eq!(project.scene_count(), 0);
    }

    #[test]
    fn project_reads_placeholder_outline() {
        for outline in ["[]", "null"] {
            let json = format!(
                r#"{{"id":"story_1_abc","title":"A cat","logline":"A cat",
                    "createdAt":"2024-01-01T00:00:00.000Z","updatedAt":"2024-01-01T00:00:00.000Z",
                    "step":1,"outline":{},"scenes":[]}}"#,
                outline
            );
            let project: Project = serde_json::from_str(&json).unwrap();
            assert!(project.outline.is_none(), "{}", outline);
        }
    }

    #[test]
    fn project_still_reads_a_real_outline() {
        let outline = Outline {
            logline: "A cat".to_string(),
            template: "Three Act Structure".to_string(),
            scenes: vec![make_scene()],
            analysis: None,
            generated_at: Utc::now(),
        };
        let json = format!(
            r#"{{"id":"story_1_abc","title":"A cat","logline":"A cat",
                "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z",
                "outline":{}}}"#,
            serde_json::to_string(&outline).unwrap()
        );
        let project: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(project.outline, Some(outline));
        assert_eq!(project.scene_count(), 1);
    }
}

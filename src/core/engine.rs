/// The outline engine: Logline → Outline orchestration.
///
/// Wires together analysis, template selection, per-beat scene writing and
/// script rendering, and owns the scene editing operations.
use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::core::analysis::{analyze, is_blank};
use crate::core::script::render_script;
use crate::core::taxonomy::{Taxonomy, TaxonomyError};
use crate::core::template::{write_scene, StoryTemplate};
use crate::schema::outline::{Analysis, Outline, Scene, ScenePatch, SceneType};
use crate::schema::project::ScriptScene;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),
}

/// The top-level outline generator. Built via `OutlineEngine::builder()`.
#[derive(Debug, Clone, Default)]
pub struct OutlineEngine {
    taxonomy: Taxonomy,
}

/// Builder for constructing an `OutlineEngine`.
#[derive(Debug, Default)]
pub struct OutlineEngineBuilder {
    taxonomy_path: Option<PathBuf>,
    /// Directly provided taxonomy (for testing without files).
    taxonomy: Option<Taxonomy>,
}

impl OutlineEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> OutlineEngineBuilder {
        OutlineEngineBuilder::default()
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn analyze(&self, logline: &str) -> Analysis {
        analyze(logline, &self.taxonomy)
    }

    /// Generate an outline for a logline. Blank input gives the empty outline.
    pub fn generate(&self, logline: &str) -> Outline {
        if is_blank(logline) {
            return self.empty_outline();
        }

        let analysis = self.analyze(logline);
        let template = StoryTemplate::select(&analysis);
        debug!(
            character = %analysis.character.name,
            genre = analysis.genre.name(),
            complexity = ?analysis.complexity,
            template = template.key(),
            "analyzed logline"
        );
        self.build_outline(logline, template, analysis)
    }

    /// Regenerate against a named template instead of the automatic choice.
    ///
    /// Unknown template keys fall back to the three-act structure.
    pub fn regenerate_with_template(&self, logline: &str, template_key: &str) -> Outline {
        let template = StoryTemplate::from_key(template_key).unwrap_or_else(|| {
            debug!(template_key, "unknown template, using three-act structure");
            StoryTemplate::ThreeAct
        });
        let analysis = self.analyze(logline);
        self.build_outline(logline, template, analysis)
    }

    /// The blank three-scene outline a fresh project starts with.
    pub fn empty_outline(&self) -> Outline {
        let scenes = StoryTemplate::Simple
            .slots()
            .iter()
            .enumerate()
            .map(|(index, slot)| Scene {
                id: format!("scene_{}", index + 1),
                title: slot.title.to_string(),
                description: slot.description.to_string(),
                content: String::new(),
                visual_prompt: String::new(),
                editable: true,
                scene_type: None,
            })
            .collect();

        Outline {
            logline: String::new(),
            template: StoryTemplate::Simple.display_name().to_string(),
            analysis: None,
            scenes,
            generated_at: Utc::now(),
        }
    }

    fn build_outline(&self, logline: &str, template: StoryTemplate, analysis: Analysis) -> Outline {
        let character = analysis.character.name.as_str();
        let action = analysis.action.as_str();
        let setting = analysis
            .primary_setting()
            .unwrap_or(self.taxonomy.default_setting.as_str());

        let scenes = template
            .slots()
            .iter()
            .enumerate()
            .map(|(index, slot)| {
                let text = write_scene(slot, index, character, action, setting);
                Scene {
                    id: format!("scene_{}", index + 1),
                    title: text.title,
                    description: slot.description.to_string(),
                    content: text.content,
                    visual_prompt: text.visual_prompt,
                    editable: true,
                    scene_type: Some(slot.scene_type()),
                }
            })
            .collect();

        Outline {
            logline: logline.to_string(),
            template: template.display_name().to_string(),
            analysis: Some(analysis),
            scenes,
            generated_at: Utc::now(),
        }
    }

    /// Render the outline as screenplay pages, one per scene.
    pub fn scriptify(&self, outline: &Outline) -> Vec<ScriptScene> {
        render_script(outline, &self.taxonomy.default_setting)
    }

    /// Merge `patch` into the scene with `scene_id`.
    ///
    /// Returns false, leaving the outline untouched, if no scene has that id.
    pub fn update_scene(&self, outline: &mut Outline, scene_id: &str, patch: ScenePatch) -> bool {
        match outline.scene_mut(scene_id) {
            Some(scene) => {
                scene.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Insert a placeholder scene and return its id.
    ///
    /// With no anchor the scene goes last; otherwise right after `after_id`.
    /// An anchor that is not in the outline inserts at the front.
    pub fn add_scene(&self, outline: &mut Outline, after_id: Option<&str>) -> String {
        let index = match after_id {
            Some(id) => outline.position(id).map_or(0, |i| i + 1),
            None => outline.scenes.len(),
        };

        let id = fresh_scene_id(outline);
        outline.scenes.insert(
            index,
            Scene {
                id: id.clone(),
                title: "New Scene".to_string(),
                description: "Custom scene".to_string(),
                content: "What happens in this scene?".to_string(),
                visual_prompt: "Description for image generation".to_string(),
                editable: true,
                scene_type: Some(SceneType::Custom("custom".to_string())),
            },
        );
        id
    }

    /// Remove the scene with `scene_id` unless it is the only one left.
    ///
    /// Returns whether a scene was removed.
    pub fn remove_scene(&self, outline: &mut Outline, scene_id: &str) -> bool {
        match outline.position(scene_id) {
            Some(index) if outline.scenes.len() > 1 => {
                outline.scenes.remove(index);
                true
            }
            _ => false,
        }
    }
}

/// `scene_<millis>`, bumped until it is unused in the outline.
fn fresh_scene_id(outline: &Outline) -> String {
    let mut stamp = Utc::now().timestamp_millis();
    loop {
        let id = format!("scene_{}", stamp);
        if outline.scene(&id).is_none() {
            return id;
        }
        stamp += 1;
    }
}

impl OutlineEngineBuilder {
    pub fn taxonomy_path(mut self, path: impl AsRef<Path>) -> Self {
        self.taxonomy_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Provide a taxonomy directly (for testing without files).
    pub fn with_taxonomy(mut self, taxonomy: Taxonomy) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    /// A taxonomy file, when given, takes precedence over `with_taxonomy`.
    pub fn build(self) -> Result<OutlineEngine, EngineError> {
        let taxonomy = match self.taxonomy_path {
            Some(path) => {
                debug!(path = %path.display(), "loading taxonomy");
                Taxonomy::load_from_ron(&path)?
            }
            None => self.taxonomy.unwrap_or_default(),
        };
        Ok(OutlineEngine { taxonomy })
    }
}

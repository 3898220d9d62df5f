//! WASM bindings for story-lab — outline generation and editing for the browser UI.
//!
//! Everything crosses the boundary as JSON strings in the same camelCase
//! shapes the project store writes.

use wasm_bindgen::prelude::*;

use story_lab::core::engine::OutlineEngine;
use story_lab::core::taxonomy::Taxonomy;
use story_lab::core::template::StoryTemplate;
use story_lab::schema::outline::{Outline, ScenePatch};

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateInfo {
    key: &'static str,
    name: &'static str,
    scene_count: usize,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct AddedScene {
    scene_id: String,
    outline: Outline,
}

fn parse_outline(outline_json: &str) -> Result<Outline, JsError> {
    serde_json::from_str(outline_json).map_err(|e| JsError::new(&format!("Invalid outline JSON: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

// ---------------------------------------------------------------------------
// StoryLab — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct StoryLab {
    engine: OutlineEngine,
}

#[wasm_bindgen]
impl StoryLab {
    /// Create an engine, optionally with a custom taxonomy given as RON.
    #[wasm_bindgen(constructor)]
    pub fn new(taxonomy_ron: Option<String>) -> Result<StoryLab, JsError> {
        let mut builder = OutlineEngine::builder();
        if let Some(src) = taxonomy_ron {
            let taxonomy = Taxonomy::parse_ron(&src)
                .map_err(|e| JsError::new(&format!("Taxonomy parse error: {e}")))?;
            builder = builder.with_taxonomy(taxonomy);
        }
        let engine = builder
            .build()
            .map_err(|e| JsError::new(&format!("Engine build error: {e}")))?;
        Ok(StoryLab { engine })
    }

    /// Analysis JSON for a logline.
    pub fn analyze(&self, logline: &str) -> Result<String, JsError> {
        to_json(&self.engine.analyze(logline))
    }

    /// Outline JSON for a logline.
    pub fn generate(&self, logline: &str) -> Result<String, JsError> {
        to_json(&self.engine.generate(logline))
    }

    /// Outline JSON built against a named template ("threeAct", "heroJourney", "simple").
    pub fn regenerate(&self, logline: &str, template_key: &str) -> Result<String, JsError> {
        to_json(&self.engine.regenerate_with_template(logline, template_key))
    }

    /// JSON array of `{sceneId, title, script}` for an outline.
    pub fn scriptify(&self, outline_json: &str) -> Result<String, JsError> {
        let outline = parse_outline(outline_json)?;
        to_json(&self.engine.scriptify(&outline))
    }

    /// Merge a partial scene (JSON) into one scene and return the outline.
    ///
    /// An unknown scene id returns the outline unchanged.
    pub fn update_scene(
        &self,
        outline_json: &str,
        scene_id: &str,
        patch_json: &str,
    ) -> Result<String, JsError> {
        let mut outline = parse_outline(outline_json)?;
        let patch: ScenePatch = serde_json::from_str(patch_json)
            .map_err(|e| JsError::new(&format!("Invalid scene JSON: {e}")))?;
        self.engine.update_scene(&mut outline, scene_id, patch);
        to_json(&outline)
    }

    /// Insert a placeholder scene. Returns `{sceneId, outline}`.
    pub fn add_scene(&self, outline_json: &str, after_id: Option<String>) -> Result<String, JsError> {
        let mut outline = parse_outline(outline_json)?;
        let scene_id = self.engine.add_scene(&mut outline, after_id.as_deref());
        to_json(&AddedScene { scene_id, outline })
    }

    /// Remove a scene unless it is the last one and return the outline.
    pub fn remove_scene(&self, outline_json: &str, scene_id: &str) -> Result<String, JsError> {
        let mut outline = parse_outline(outline_json)?;
        self.engine.remove_scene(&mut outline, scene_id);
        to_json(&outline)
    }

    /// Return JSON array of the available templates.
    pub fn templates() -> String {
        let templates: Vec<TemplateInfo> = StoryTemplate::ALL
            .iter()
            .map(|t| TemplateInfo {
                key: t.key(),
                name: t.display_name(),
                scene_count: t.slots().len(),
            })
            .collect();
        serde_json::to_string(&templates).unwrap_or_else(|_| "[]".to_string())
    }
}

/// The story wizard: one project walked through Idea → Script → Visuals → Cuts.
///
/// A session borrows the engine, the storage and the key registry, owns
/// the project it edits, and persists every change before returning.
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::analysis::{is_blank, trim_space};
use crate::core::engine::OutlineEngine;
use crate::core::keys::{Service, SessionKeys};
use crate::core::storage::{ProjectStore, StorageError, StoryStorage};
use crate::core::visuals::{enhance_prompt, mock_images, validate_image_url};
use crate::schema::outline::{Outline, ScenePatch};
use crate::schema::project::{Project, ScriptScene, StyleStatus, VisualScene, WizardStep};

/// Most scenes an outline can be grown to by hand.
pub const MAX_SCENES: usize = 5;

/// Most generated candidates kept per visual scene.
pub const MAX_GENERATED_IMAGES: usize = 4;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("step {0} does not exist")]
    StepOutOfRange(u8),
    #[error("step {requested} is not reachable yet (furthest is {max})")]
    StepLocked { requested: u8, max: u8 },
    #[error("please enter your story idea first")]
    EmptyLogline,
    #[error("the {0} step cannot be skipped")]
    SkipNotAllowed(&'static str),
    #[error("generate an outline first")]
    NoOutline,
    #[error("load scenes for visuals first")]
    VisualsNotLoaded,
    #[error("no scene with id '{0}'")]
    SceneNotFound(String),
    #[error("cannot delete the last scene")]
    LastScene,
    #[error("maximum {0} scenes allowed")]
    TooManyScenes(usize),
    #[error("enter a visual description first")]
    EmptyPrompt,
    #[error("{0} needs an API key")]
    MissingKey(Service),
    #[error("invalid image URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub struct StorySession<'a, S: ProjectStore> {
    engine: &'a OutlineEngine,
    storage: &'a mut StoryStorage<S>,
    keys: &'a SessionKeys,
    project: Project,
}

impl<'a, S: ProjectStore> StorySession<'a, S> {
    pub fn new(
        engine: &'a OutlineEngine,
        storage: &'a mut StoryStorage<S>,
        keys: &'a SessionKeys,
        project: Project,
    ) -> Self {
        Self {
            engine,
            storage,
            keys,
            project,
        }
    }

    /// Resume a stored project.
    pub fn open(
        engine: &'a OutlineEngine,
        storage: &'a mut StoryStorage<S>,
        keys: &'a SessionKeys,
        id: &str,
    ) -> Result<Self, SessionError> {
        let project = storage
            .load_project(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        Ok(Self::new(engine, storage, keys, project))
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn into_project(self) -> Project {
        self.project
    }

    pub fn current_step(&self) -> WizardStep {
        self.project.step
    }

    fn save(&mut self) -> Result<(), SessionError> {
        self.storage.save_project(&mut self.project)?;
        Ok(())
    }

    fn outline_mut(&mut self) -> Result<&mut Outline, SessionError> {
        self.project.outline.as_mut().ok_or(SessionError::NoOutline)
    }

    // Navigation

    /// The furthest step reachable from the current one.
    pub fn max_accessible_step(&self) -> WizardStep {
        self.project.step.next().unwrap_or(WizardStep::LAST)
    }

    pub fn go_to_step(&mut self, number: u8) -> Result<WizardStep, SessionError> {
        let step = WizardStep::try_from(number).map_err(|_| SessionError::StepOutOfRange(number))?;
        let max = self.max_accessible_step();
        if step > max {
            return Err(SessionError::StepLocked {
                requested: number,
                max: max.number(),
            });
        }

        debug!(from = self.project.step.number(), to = number, "changing step");
        self.project.step = step;
        self.save()?;
        Ok(step)
    }

    /// Whether the current step has what it needs to move on.
    pub fn can_proceed(&self) -> bool {
        match self.project.step {
            WizardStep::Idea => !is_blank(&self.project.logline),
            _ => true,
        }
    }

    /// Advance one step. On the last step this stays put.
    pub fn next_step(&mut self) -> Result<WizardStep, SessionError> {
        if !self.can_proceed() {
            return Err(SessionError::EmptyLogline);
        }
        match self.project.step.next() {
            Some(next) => self.go_to_step(next.number()),
            None => Ok(self.project.step),
        }
    }

    pub fn previous_step(&mut self) -> Result<WizardStep, SessionError> {
        match self.project.step.previous() {
            Some(previous) => self.go_to_step(previous.number()),
            None => Ok(self.project.step),
        }
    }

    /// Only the script step is optional.
    pub fn is_skip_allowed(&self) -> bool {
        self.project.step == WizardStep::Script
    }

    /// Record the current step as skipped and advance.
    pub fn skip_step(&mut self) -> Result<WizardStep, SessionError> {
        let step = self.project.step;
        if !self.is_skip_allowed() {
            return Err(SessionError::SkipNotAllowed(step.label()));
        }
        if !self.project.skipped_steps.contains(&step) {
            self.project.skipped_steps.push(step);
        }
        self.next_step()
    }

    // Idea & outline

    pub fn set_logline(&mut self, logline: &str) -> Result<(), SessionError> {
        self.storage.update_logline(&mut self.project, logline)?;
        Ok(())
    }

    /// Replace the outline with one generated from the project's logline.
    pub fn generate_outline(&mut self) -> Result<&Outline, SessionError> {
        if is_blank(&self.project.logline) {
            return Err(SessionError::EmptyLogline);
        }
        let outline = self.engine.generate(&self.project.logline);
        self.replace_outline(outline)
    }

    pub fn regenerate_with_template(&mut self, template_key: &str) -> Result<&Outline, SessionError> {
        if is_blank(&self.project.logline) {
            return Err(SessionError::EmptyLogline);
        }
        let outline = self
            .engine
            .regenerate_with_template(&self.project.logline, template_key);
        self.replace_outline(outline)
    }

    fn replace_outline(&mut self, outline: Outline) -> Result<&Outline, SessionError> {
        info!(
            id = %self.project.id,
            template = %outline.template,
            scenes = outline.scenes.len(),
            "generated outline"
        );
        self.project.outline = Some(outline);
        self.refresh_script();
        self.save()?;
        self.project.outline.as_ref().ok_or(SessionError::NoOutline)
    }

    /// Replace a scene's content with the trimmed text.
    pub fn edit_scene_content(&mut self, scene_id: &str, content: &str) -> Result<(), SessionError> {
        let engine = self.engine;
        let outline = self.outline_mut()?;
        if !engine.update_scene(outline, scene_id, ScenePatch::content(trim_space(content))) {
            return Err(SessionError::SceneNotFound(scene_id.to_string()));
        }
        self.refresh_script();
        self.save()
    }

    pub fn delete_scene(&mut self, scene_id: &str) -> Result<(), SessionError> {
        let engine = self.engine;
        let outline = self.outline_mut()?;
        if outline.scenes.len() <= 1 {
            return Err(SessionError::LastScene);
        }
        if !engine.remove_scene(outline, scene_id) {
            return Err(SessionError::SceneNotFound(scene_id.to_string()));
        }
        self.refresh_script();
        self.save()
    }

    /// Add a placeholder scene (after `after_id`, or last) and return its id.
    pub fn add_scene(&mut self, after_id: Option<&str>) -> Result<String, SessionError> {
        let engine = self.engine;
        let outline = self.outline_mut()?;
        if outline.scenes.len() >= MAX_SCENES {
            return Err(SessionError::TooManyScenes(MAX_SCENES));
        }
        let id = engine.add_scene(outline, after_id);
        self.refresh_script();
        self.save()?;
        Ok(id)
    }

    // Script

    pub fn set_script_enabled(&mut self, enabled: bool) -> Result<(), SessionError> {
        self.project.script.enabled = enabled;
        self.refresh_script();
        self.save()
    }

    /// The rendered script, or `None` while script mode is off.
    pub fn script(&self) -> Option<&[ScriptScene]> {
        self.project
            .script
            .enabled
            .then_some(self.project.script.scenes.as_slice())
    }

    fn refresh_script(&mut self) {
        self.project.script.scenes = match (&self.project.outline, self.project.script.enabled) {
            (Some(outline), true) => self.engine.scriptify(outline),
            _ => Vec::new(),
        };
    }

    // Visuals

    /// Snapshot the outline into visual scenes the first time visuals are
    /// opened. Later calls return the existing snapshot.
    pub fn load_visual_scenes(&mut self) -> Result<&[VisualScene], SessionError> {
        if self.project.visual_scenes.is_none() {
            let outline = self.project.outline.as_ref().ok_or(SessionError::NoOutline)?;
            let scenes = outline
                .scenes
                .iter()
                .enumerate()
                .map(|(index, scene)| VisualScene::from_scene(scene, index))
                .collect();
            self.project.visual_scenes = Some(scenes);
            self.save()?;
        }
        Ok(self.visual_scenes())
    }

    pub fn visual_scenes(&self) -> &[VisualScene] {
        self.project.visual_scenes.as_deref().unwrap_or(&[])
    }

    fn visual_scene_mut(&mut self, scene_id: &str) -> Result<&mut VisualScene, SessionError> {
        if self.project.visual_scenes.is_none() {
            return Err(SessionError::VisualsNotLoaded);
        }
        self.project
            .visual_scene_mut(scene_id)
            .ok_or_else(|| SessionError::SceneNotFound(scene_id.to_string()))
    }

    pub fn update_prompt(&mut self, scene_id: &str, prompt: &str) -> Result<(), SessionError> {
        self.visual_scene_mut(scene_id)?.prompt = trim_space(prompt).to_string();
        self.save()
    }

    /// Append a random style enhancement. Returns false if the prompt was
    /// already detailed and nothing changed.
    pub fn enhance_prompt<R: Rng>(&mut self, scene_id: &str, rng: &mut R) -> Result<bool, SessionError> {
        let scene = self.visual_scene_mut(scene_id)?;
        match enhance_prompt(&scene.prompt, rng) {
            Some(enhanced) => {
                scene.prompt = enhanced;
                self.save()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Restore the prompt from the outline scene it was taken from.
    pub fn reset_prompt(&mut self, scene_id: &str) -> Result<(), SessionError> {
        let original = self
            .project
            .outline
            .as_ref()
            .and_then(|o| o.scene(scene_id))
            .map(|s| {
                if s.visual_prompt.is_empty() {
                    s.content.clone()
                } else {
                    s.visual_prompt.clone()
                }
            })
            .ok_or_else(|| SessionError::SceneNotFound(scene_id.to_string()))?;
        self.visual_scene_mut(scene_id)?.prompt = original;
        self.save()
    }

    /// Add generated candidates for a scene and return how many were kept.
    ///
    /// Needs a non-blank prompt and an image-generation key. The first
    /// candidate is selected if nothing is selected yet.
    pub fn generate_images(&mut self, scene_id: &str) -> Result<usize, SessionError> {
        let has_key = self.keys.has_key(Service::ImageGeneration);
        let scene = self.visual_scene_mut(scene_id)?;
        if is_blank(&scene.prompt) {
            return Err(SessionError::EmptyPrompt);
        }
        if !has_key {
            return Err(SessionError::MissingKey(Service::ImageGeneration));
        }

        let before = scene.generated_images.len();
        let room = MAX_GENERATED_IMAGES.saturating_sub(before);
        scene
            .generated_images
            .extend(mock_images(&scene.prompt).into_iter().take(room));
        if scene.selected_image.is_none() {
            scene.selected_image = scene.generated_images.first().map(|img| img.url.clone());
        }
        let added = scene.generated_images.len() - before;
        debug!(scene_id, added, "generated images");
        self.save()?;
        Ok(added)
    }

    /// Attach a pasted image URL, selecting it if nothing is selected.
    pub fn add_image_url(&mut self, scene_id: &str, url: &str) -> Result<(), SessionError> {
        let url = validate_image_url(url)?;
        let scene = self.visual_scene_mut(scene_id)?;
        if scene.selected_image.is_none() {
            scene.selected_image = Some(url.clone());
        }
        scene.image_url = Some(url);
        self.save()
    }

    pub fn select_image(&mut self, scene_id: &str, url: &str) -> Result<(), SessionError> {
        self.visual_scene_mut(scene_id)?.selected_image = Some(url.to_string());
        self.save()
    }

    /// Set or clear (blank `style`) a per-scene style override.
    pub fn set_custom_style(&mut self, scene_id: &str, style: &str) -> Result<(), SessionError> {
        let style = trim_space(style);
        self.visual_scene_mut(scene_id)?.custom_style =
            (!style.is_empty()).then(|| style.to_string());
        self.save()
    }

    pub fn style_status(&self, scene_id: &str) -> Result<StyleStatus, SessionError> {
        self.visual_scenes()
            .iter()
            .find(|s| s.id == scene_id)
            .map(|s| s.style_status(self.project.global_style_locked))
            .ok_or_else(|| SessionError::SceneNotFound(scene_id.to_string()))
    }

    /// Flip the global style lock and return the new state.
    pub fn toggle_global_style(&mut self) -> Result<bool, SessionError> {
        self.project.global_style_locked = !self.project.global_style_locked;
        self.save()?;
        Ok(self.project.global_style_locked)
    }
}

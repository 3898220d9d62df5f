/// Screenplay rendering for outlines.
use crate::schema::outline::{Beat, Outline, Scene};
use crate::schema::project::ScriptScene;

/// Render every scene of `outline` as a short screenplay page.
///
/// Outlines without an analysis (the blank starter outline) have no
/// character to voice and render to nothing.
pub fn render_script(outline: &Outline, fallback_setting: &str) -> Vec<ScriptScene> {
    let Some(analysis) = &outline.analysis else {
        return Vec::new();
    };
    let character = analysis.character.name.to_uppercase();
    let setting = analysis
        .primary_setting()
        .unwrap_or(fallback_setting)
        .to_uppercase();

    outline
        .scenes
        .iter()
        .map(|scene| ScriptScene {
            scene_id: scene.id.clone(),
            title: scene.title.clone(),
            script: render_scene(scene, &character, &setting),
        })
        .collect()
}

fn render_scene(scene: &Scene, character: &str, setting: &str) -> String {
    let mut script = String::new();

    script.push_str(&format!("{}\n\n", scene.title.to_uppercase()));
    script.push_str("FADE IN:\n\n");
    script.push_str(&format!("INT/EXT. {} - DAY\n\n", setting));
    script.push_str(&format!("{}\n\n", scene.content));

    if let Some((direction, line)) = scene
        .scene_type
        .as_ref()
        .and_then(|t| t.dialogue_beat())
        .map(dialogue)
    {
        script.push_str(&format!("{}\n({})\n{}\n\n", character, direction, line));
    }

    script.push_str("FADE OUT.\n");
    script
}

/// Parenthetical and line for a beat.
fn dialogue(beat: Beat) -> (&'static str, &'static str) {
    match beat {
        Beat::Opening => ("to themselves", "Another ordinary day... or is it?"),
        Beat::Inciting => ("excited", "This could be exactly what I've been looking for!"),
        Beat::Rising => ("determined", "I won't give up. There has to be a way."),
        Beat::Climax => ("with confidence", "I know what I have to do."),
        Beat::Resolution => ("satisfied", "It wasn't easy, but it was worth it."),
    }
}

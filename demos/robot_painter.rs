/// Robot Painter demo — one story walked through every wizard step.
///
/// Idea → outline → script → visuals, using an in-memory store.
///
/// Run with: cargo run --example robot_painter

use rand::rngs::StdRng;
use rand::SeedableRng;
use story_lab::core::engine::OutlineEngine;
use story_lab::core::keys::{Service, SessionKeys};
use story_lab::core::session::StorySession;
use story_lab::core::storage::{MemoryStore, StoryStorage};

fn main() {
    let engine = OutlineEngine::builder()
        .build()
        .expect("Failed to build engine");
    let mut storage = StoryStorage::new(MemoryStore::new());
    let mut keys = SessionKeys::new();
    keys.set_key(Service::ImageGeneration, "custom", "demo-key")
        .expect("Failed to store key");
    let mut rng = StdRng::seed_from_u64(2026);

    let project = storage
        .create_project("A robot learns to paint watercolors")
        .expect("Failed to create project");
    println!("=== {} ===\n", project.title);

    let mut session = StorySession::new(&engine, &mut storage, &keys, project);

    // --- Step 1: Idea ---
    let outline = session.generate_outline().expect("Failed to generate outline");
    if let Some(analysis) = &outline.analysis {
        println!(
            "Character: {} ({}), genre: {}, complexity: {:?}",
            analysis.character.name,
            analysis.character.kind.name(),
            analysis.genre.name(),
            analysis.complexity
        );
    }
    println!("Template: {}\n", outline.template);
    for (i, scene) in outline.scenes.iter().enumerate() {
        println!("{}. {} — {}", i + 1, scene.title, scene.content);
    }
    session.next_step().expect("Failed to advance");

    // --- Step 2: Script ---
    println!("\n--- Script ---\n");
    for scene in session.script().unwrap_or_default() {
        println!("{}", scene.script);
    }
    session.next_step().expect("Failed to advance");

    // --- Step 3: Visuals ---
    println!("--- Visuals ---\n");
    let ids: Vec<String> = session
        .load_visual_scenes()
        .expect("Failed to load visual scenes")
        .iter()
        .map(|s| s.id.clone())
        .collect();
    session
        .enhance_prompt(&ids[0], &mut rng)
        .expect("Failed to enhance prompt");
    session
        .generate_images(&ids[0])
        .expect("Failed to generate images");
    session
        .set_custom_style(&ids[1], "soft watercolor")
        .expect("Failed to set style");

    for scene in session.visual_scenes() {
        let status = session.style_status(&scene.id).expect("scene exists");
        println!(
            "{}. {} [{}]\n   {}",
            scene.scene_number,
            scene.title,
            status.label(),
            scene.prompt
        );
        if let Some(url) = &scene.selected_image {
            println!("   selected: {}", url);
        }
    }
}

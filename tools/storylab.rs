/// Story Lab — command-line front end for the project store and outline engine.
///
/// Usage: storylab [--config storylab.ron] [--log-level debug] <command>

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use story_lab::core::config::StoryLabConfig;
use story_lab::core::keys::{Service, SessionKeys};
use story_lab::core::session::StorySession;
use story_lab::core::storage::{JsonFileStore, StoryStorage};
use story_lab::schema::project::Project;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    /// RON config file; defaults apply if it does not exist
    #[clap(short, long, global = true, default_value = "storylab.ron")]
    config: PathBuf,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a project from a logline
    New { logline: String },
    /// List projects, newest first
    List,
    /// Print a project's outline
    Show { id: String },
    Delete { id: String },
    /// Replace a project's logline (and title)
    Logline { id: String, logline: String },
    /// Generate the outline from the project's logline
    Generate { id: String },
    /// Regenerate with a template: threeAct, heroJourney or simple
    Template { id: String, template: String },
    /// Print the script, or switch script mode
    Script {
        id: String,
        #[clap(long, conflicts_with = "off")]
        on: bool,
        #[clap(long)]
        off: bool,
    },
    AddScene {
        id: String,
        /// Insert after this scene instead of at the end
        #[clap(long)]
        after: Option<String>,
    },
    EditScene {
        id: String,
        scene_id: String,
        content: String,
    },
    RemoveScene { id: String, scene_id: String },
    /// Load and print the visual scenes
    Visuals { id: String },
    /// Generate placeholder images for one visual scene
    Images {
        id: String,
        scene_id: String,
        /// Image generation API key, kept for this run only
        #[clap(long)]
        key: String,
        #[clap(long, default_value = "custom")]
        provider: String,
    },
    /// Attach an image URL to a visual scene
    Attach {
        id: String,
        scene_id: String,
        url: String,
    },
    /// Print a project as pretty JSON
    Export { id: String },
    /// Show storage usage
    Info,
    /// Delete every project
    Clear {
        #[clap(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    let config = if args.config.exists() {
        StoryLabConfig::load_from_ron(&args.config)
            .with_context(|| format!("loading {}", args.config.display()))?
    } else {
        StoryLabConfig::default()
    };
    let engine = config.build_engine()?;
    let mut storage = config.open_storage();
    let mut keys = SessionKeys::new();

    match args.command {
        Commands::New { logline } => {
            let project = storage.create_project(&logline)?;
            println!("{}", project.id);
        }
        Commands::List => {
            let projects = storage.list_projects();
            if projects.is_empty() {
                println!("No stories yet.");
            }
            for project in &projects {
                println!(
                    "{}  {:<28} {:<9} step {}  {} scenes  {}",
                    project.id,
                    project.title,
                    project.status.label(),
                    project.step.number(),
                    project.scene_count(),
                    project.updated_at.format("%Y-%m-%d %H:%M"),
                );
            }
        }
        Commands::Show { id } => print_project(&find(&storage, &id)?),
        Commands::Delete { id } => {
            find(&storage, &id)?;
            storage.delete_project(&id)?;
            info!("Deleted {}", id);
        }
        Commands::Logline { id, logline } => {
            let mut session = StorySession::open(&engine, &mut storage, &keys, &id)?;
            session.set_logline(&logline)?;
            println!("{}", session.project().title);
        }
        Commands::Generate { id } => {
            let mut session = StorySession::open(&engine, &mut storage, &keys, &id)?;
            session.generate_outline()?;
            print_project(session.project());
        }
        Commands::Template { id, template } => {
            let mut session = StorySession::open(&engine, &mut storage, &keys, &id)?;
            session.regenerate_with_template(&template)?;
            print_project(session.project());
        }
        Commands::Script { id, on, off } => {
            let mut session = StorySession::open(&engine, &mut storage, &keys, &id)?;
            if on || off {
                session.set_script_enabled(on)?;
            }
            match session.script() {
                Some(scenes) if scenes.is_empty() => println!("Generate an outline first to see scripts."),
                Some(scenes) => {
                    for scene in scenes {
                        println!("{}", scene.script);
                    }
                }
                None => println!("Script mode is disabled."),
            }
        }
        Commands::AddScene { id, after } => {
            let mut session = StorySession::open(&engine, &mut storage, &keys, &id)?;
            let scene_id = session.add_scene(after.as_deref())?;
            println!("{}", scene_id);
        }
        Commands::EditScene {
            id,
            scene_id,
            content,
        } => {
            let mut session = StorySession::open(&engine, &mut storage, &keys, &id)?;
            session.edit_scene_content(&scene_id, &content)?;
        }
        Commands::RemoveScene { id, scene_id } => {
            let mut session = StorySession::open(&engine, &mut storage, &keys, &id)?;
            session.delete_scene(&scene_id)?;
        }
        Commands::Visuals { id } => {
            let mut session = StorySession::open(&engine, &mut storage, &keys, &id)?;
            session.load_visual_scenes()?;
            for scene in session.visual_scenes() {
                let status = session.style_status(&scene.id)?;
                println!(
                    "{}. {} [{}] ({}/4 images)\n   {}",
                    scene.scene_number,
                    scene.title,
                    status.label(),
                    scene.image_count(),
                    scene.prompt
                );
                if let Some(selected) = &scene.selected_image {
                    println!("   selected: {}", selected);
                }
            }
        }
        Commands::Images {
            id,
            scene_id,
            key,
            provider,
        } => {
            keys.set_key(Service::ImageGeneration, &provider, &key)?;
            let mut session = StorySession::open(&engine, &mut storage, &keys, &id)?;
            session.load_visual_scenes()?;
            let added = session.generate_images(&scene_id)?;
            println!("Added {} images", added);
        }
        Commands::Attach { id, scene_id, url } => {
            let mut session = StorySession::open(&engine, &mut storage, &keys, &id)?;
            session.load_visual_scenes()?;
            session.add_image_url(&scene_id, &url)?;
        }
        Commands::Export { id } => {
            let json = storage
                .export_project(&id)?
                .ok_or_else(|| anyhow!("no project with id {}", id))?;
            println!("{}", json);
        }
        Commands::Info => {
            let info = storage.storage_info()?;
            println!(
                "{} projects, {} of {} in {}",
                info.project_count,
                info.total_size_formatted,
                story_lab::core::storage::format_bytes(config.quota_bytes),
                storage.store().path().display()
            );
        }
        Commands::Clear { yes } => {
            if !yes {
                return Err(anyhow!("refusing to delete every project without --yes"));
            }
            storage.clear_all()?;
            info!("Cleared all projects");
        }
    }

    Ok(())
}

fn find(storage: &StoryStorage<JsonFileStore>, id: &str) -> Result<Project> {
    storage
        .load_project(id)
        .ok_or_else(|| anyhow!("no project with id {}", id))
}

fn print_project(project: &Project) {
    println!("{} ({})", project.title, project.id);
    println!("Logline: {}", project.logline);
    let Some(outline) = &project.outline else {
        println!("No outline yet.");
        return;
    };
    println!("Template: {}", outline.template);
    if let Some(analysis) = &outline.analysis {
        println!(
            "Character: {} ({}), genre: {}, complexity: {:?}",
            analysis.character.name,
            analysis.character.kind.name(),
            analysis.genre.name(),
            analysis.complexity
        );
    }
    for (index, scene) in outline.scenes.iter().enumerate() {
        println!("\n{}. {} [{}]", index + 1, scene.title, scene.id);
        println!("   {}", scene.description);
        if !scene.content.is_empty() {
            println!("   {}", scene.content);
        }
    }
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_deref()
        .unwrap_or("info")
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level.to_string()))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

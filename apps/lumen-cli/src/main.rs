use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::{Vec2, Vec3};
use lumen_assets::shapes;
use lumen_ecs::{ComponentStore, EventQueue};
use lumen_render::{ForwardRenderingSystem, MeshCache, RecordingDevice, RenderConfig};
use lumen_tools::{SceneDescription, SceneInspector};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lumen-cli", about = "CLI for lumen scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Render a scene file on the recording device
    Render {
        /// Scene description (.yaml, .yml or .json)
        #[arg(short, long)]
        scene: PathBuf,
        /// Number of frames to render
        #[arg(short, long, default_value = "1")]
        frames: u64,
        /// Render configuration (.yaml, .yml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the device command log of the last frame
        #[arg(short, long)]
        dump: bool,
    },
    /// Render the built-in demo scene
    Demo {
        /// Number of frames to render
        #[arg(short, long, default_value = "3")]
        frames: u64,
    },
    /// List a scene's entities the way the inspector shows them
    Inspect {
        /// Scene description; the demo scene when omitted
        #[arg(short, long)]
        scene: Option<PathBuf>,
    },
    /// Print vertex and index counts of the procedural shapes
    Shapes,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Info => {
            println!("lumen-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", lumen_common::crate_info());
            println!("ecs: {}", lumen_ecs::crate_info());
            println!("assets: {}", lumen_assets::crate_info());
            println!("render: {}", lumen_render::crate_info());
            println!("tools: {}", lumen_tools::crate_info());
        }
        Commands::Render {
            scene,
            frames,
            config,
            dump,
        } => {
            let description = SceneDescription::load(&scene)
                .with_context(|| format!("loading scene {}", scene.display()))?;
            let config = match config {
                Some(path) => RenderConfig::load(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => RenderConfig::default(),
            };
            render(&description, config, frames, dump)?;
        }
        Commands::Demo { frames } => {
            render(
                &SceneDescription::demo(),
                RenderConfig::default(),
                frames,
                false,
            )?;
        }
        Commands::Inspect { scene } => {
            let description = match scene {
                Some(path) => SceneDescription::load(&path)
                    .with_context(|| format!("loading scene {}", path.display()))?,
                None => SceneDescription::demo(),
            };
            inspect(&description)?;
        }
        Commands::Shapes => {
            let quad = shapes::quad_2d(Vec2::ONE);
            print_shape("quad_2d", quad.vertex_count(), quad.index_count());
            let plane = shapes::plane(1.0, 1.0);
            print_shape("plane", plane.vertex_count(), plane.index_count());
            let cube_floats = shapes::cube_vertices(1.0, 1.0, 1.0).len();
            println!(
                "{:<12} vertices={:<6} floats={cube_floats}",
                "cube",
                cube_floats / 5
            );
            let cube = shapes::box_mesh(Vec3::ONE, false);
            print_shape("box", cube.vertex_count(), cube.index_count());
            let outline = shapes::box_outline(Vec3::ONE, Vec3::ONE);
            print_shape("box_outline", outline.vertex_count(), outline.index_count());
            let cylinder = shapes::cylinder(1.0, 0.5, 16);
            print_shape("cylinder", cylinder.vertex_count(), cylinder.index_count());
            let sphere = shapes::sphere(0.5, 16, 16);
            print_shape("sphere", sphere.vertex_count(), sphere.index_count());
            let cone = shapes::cone(1.0, 0.5, 16, 2);
            print_shape("cone", cone.vertex_count(), cone.index_count());
        }
    }

    Ok(())
}

fn print_shape(name: &str, vertices: usize, indices: usize) {
    println!("{name:<12} vertices={vertices:<6} indices={indices}");
}

fn render(
    description: &SceneDescription,
    config: RenderConfig,
    frames: u64,
    dump: bool,
) -> anyhow::Result<()> {
    let mut system = ForwardRenderingSystem::new(RecordingDevice::new(), config)?;
    let mut store = ComponentStore::new();
    let mut cache = MeshCache::new();
    description.spawn(&mut store, system.device_mut(), &mut cache)?;
    println!(
        "Scene {:?}: entities={}, unique meshes={}",
        description.name,
        store.entity_count(),
        cache.len()
    );

    let mut events = EventQueue::new();
    let frame_time = Duration::from_secs_f64(1.0 / 60.0);
    for _ in 0..frames {
        system.device_mut().take_commands();
        let stats = system.update(&store, &mut events, frame_time)?;
        println!(
            "Frame {}: chunk draws={}, marker draws={}, camera={}, light={}",
            stats.frame,
            stats.chunk_draws,
            stats.marker_draws,
            stats.camera.map_or_else(|| "none".to_string(), |e| e.to_string()),
            stats.light.map_or_else(|| "none".to_string(), |e| e.to_string()),
        );
    }
    tracing::debug!(events = events.drain().len(), "frame events");

    if dump {
        println!("Device commands (last frame):");
        for command in system.device().commands() {
            println!("  {command}");
        }
    }
    Ok(())
}

fn inspect(description: &SceneDescription) -> anyhow::Result<()> {
    let mut store = ComponentStore::new();
    let mut device = RecordingDevice::new();
    let mut cache = MeshCache::new();
    description.spawn(&mut store, &mut device, &mut cache)?;

    println!("{}", SceneInspector::summary(&store));
    let mut inspector = SceneInspector::new();
    for item in inspector.entity_list(&store) {
        inspector.select(&store, item.entity)?;
        let sections: Vec<String> = inspector
            .component_sections(&store)
            .iter()
            .map(ToString::to_string)
            .collect();
        let fields = inspector.transform_fields(&store)?;
        println!(
            "  {:<16} position=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2}) [{}]",
            item.label,
            fields.position.x,
            fields.position.y,
            fields.position.z,
            fields.scale.x,
            fields.scale.y,
            fields.scale.z,
            sections.join(", ")
        );
    }
    Ok(())
}

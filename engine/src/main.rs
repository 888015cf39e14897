use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use common::configs::{to_file, Config};
use common::core::scene::Scene;
use glam::Vec3;
use log::info;

use engine::scene_builder::SceneBuilder;
use engine::scene_loop::{OrbitCursor, SceneLoop, DEFAULT_TICK_RATE};
use engine::simulation::obj_collider::load_mesh;
use engine::simulation::registry::BodySyncRegistry;

/// Headless physics sandbox: primitive solids tumbling inside a closed box, nudged by a cursor
/// probe.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON configuration file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// stop after this many frames instead of running until killed
    #[arg(short, long)]
    frames: Option<u64>,

    /// milliseconds per frame
    #[arg(short, long, default_value_t = DEFAULT_TICK_RATE)]
    tick_rate: u64,

    /// seed for object placement, overrides the configuration
    #[arg(short, long)]
    seed: Option<u64>,

    /// OBJ meshes to drop into the box as convex hulls
    #[arg(short, long)]
    mesh: Vec<PathBuf>,

    /// write the effective configuration to this path and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = Config::load_or_default(args.config.as_ref())?;
    if args.seed.is_some() {
        config.scene.seed = args.seed;
    }
    if let Some(path) = &args.dump_config {
        to_file(&config, path)?;
        info!("Configuration written to {}", path.display());
        return Ok(());
    }

    let mut scene = Scene::new();
    let mut registry = BodySyncRegistry::with_policy(config.physics);
    let builder = SceneBuilder::new(config.scene.clone());
    builder
        .build(&mut scene, &mut registry)
        .context("Failed to build the scene")?;

    for path in &args.mesh {
        let geometry = load_mesh(path)?;
        let handle = builder
            .add_mesh(&mut scene, &mut registry, geometry, Vec3::ZERO)
            .with_context(|| format!("Mesh {} cannot be simulated", path.display()))?;
        info!("Mesh {} added as {}", path.display(), handle);
    }

    let cursor = OrbitCursor {
        radius: config.scene.boundary.size / 4.0,
        height: 0.0,
        speed: 1.0,
    };
    let running = Arc::new(AtomicBool::new(true));
    let mut scene_loop = SceneLoop::new(
        scene,
        registry,
        cursor,
        running,
        Duration::from_millis(args.tick_rate),
    );
    scene_loop.run(args.frames).context("Simulation step failed")?;

    for handle in scene_loop.registry().dynamic_handles() {
        if let Some(renderable) = scene_loop.scene().get(*handle) {
            info!(
                "{} {} at {}",
                handle,
                renderable.geometry.kind(),
                renderable.transform.translation
            );
        }
    }
    info!("Ran {} frames", scene_loop.frames());
    Ok(())
}

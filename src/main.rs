//! Harrier Engine main entry point.
//!
//! A headless 2D engine core written in Rust using:
//! - **bevy_ecs** for entity-component-system architecture
//! - **glam** for 2D vector math
//!
//! The executable runs a Space Harrier style scene for a fixed number of
//! ticks: a scrolling world root, pooled obstacles and shots, and trigger
//! colliders reporting contacts. Nothing is rendered.
//!
//! # Main Loop
//!
//! 1. Load `config.ini` (or the path given with `--config`)
//! 2. Build the ECS world, the scene and its pools
//! 3. Register observers and the tick schedule
//! 4. Advance the fixed-step loop:
//!    - Steer, move, spawn, shoot
//!    - Detect collisions and recycle expired objects
//! 5. Report a summary and tear the scene down
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --ticks 1200 --json
//! ```

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use clap::Parser;
use harrierengine::events::collision::observe_log_collision;
use harrierengine::game;
use harrierengine::resources::gameconfig::GameConfig;
use harrierengine::resources::worldtime::WorldTime;
use harrierengine::systems::time::update_world_time;
use std::path::PathBuf;

/// Harrier Engine 2D
#[derive(Parser)]
#[command(version, about = "Headless run of the Harrier Engine scene graph, colliders and pools.")]
struct Cli {
    /// Path to the INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Override the number of ticks to simulate.
    #[arg(long)]
    ticks: Option<u32>,

    /// Print the end-of-run summary as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    log::info!("Hello, world! This is the Harrier Engine!");
    let mut config = GameConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        log::warn!("{e}; using default configuration");
    }
    if let Some(ticks) = cli.ticks {
        config.ticks = ticks;
    }
    let ticks = config.ticks;
    let delta = config.delta;

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(config);
    game::setup(&mut world);

    world.spawn(Observer::new(observe_log_collision));
    world.spawn(Observer::new(game::observe_demo_collision));
    // Ensure the observers are registered before any system triggers events.
    world.flush();

    let mut update = game::build_schedule();

    // --------------- Main loop ---------------
    for _ in 0..ticks {
        update_world_time(&mut world, delta);
        update.run(&mut world);
        world.clear_trackers();
    }

    let summary = game::summary(&world);
    log::info!(
        "Ran {} ticks: {} spawns, {} returns, {} collisions, {} exhausted",
        summary.ticks,
        summary.spawns,
        summary.returns,
        summary.collisions,
        summary.exhausted
    );
    if cli.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                log::error!("Failed to serialize summary: {e}");
                std::process::exit(1);
            }
        }
    }

    game::teardown(&mut world);
}

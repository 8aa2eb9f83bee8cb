/*
 * Boid Flocking Simulation
 *
 * Agents move in 2D under three rules (separation, alignment, cohesion) plus
 * obstacle avoidance. By default this opens the interactive viewer; with
 * `--headless <TICKS>` it runs the scenario without a window and, given
 * `--export`, writes the recorded frames to CSV.
 */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use flocking::export::{Recorder, DEFAULT_EXPORT_PATH};
use flocking::{Scenario, World};

#[derive(Parser, Debug)]
#[command(name = "flocking")]
#[command(about = "2D boid flocking simulation with obstacles and CSV export")]
struct Cli {
    /// Scenario file (TOML); built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for reproducible runs, overriding the scenario
    #[arg(short, long)]
    seed: Option<u64>,

    /// Run this many ticks without a window, then export
    #[arg(long, value_name = "TICKS")]
    headless: Option<u64>,

    /// Where exported CSV data is written (viewer default: data/boid_simulation_data.csv)
    #[arg(short, long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut scenario = match &cli.config {
        Some(path) => Scenario::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Scenario::default(),
    };
    if cli.seed.is_some() {
        scenario.world.seed = cli.seed;
    }
    let world = scenario.build().context("building scenario")?;

    match cli.headless {
        Some(ticks) => run_headless(world, ticks, cli.export.as_deref()),
        None => run_viewer(world, cli.export.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_PATH))),
    }
}

fn run_headless(mut world: World, ticks: u64, export: Option<&Path>) -> Result<()> {
    let mut recorder = Recorder::new();
    world.start()?;

    let mut last = None;
    for _ in 0..ticks {
        let summary = world.tick()?;
        recorder.record(summary.tick, &world.snapshot());
        last = Some(summary);
    }

    if let Some(summary) = last {
        info!(
            ticks = summary.tick,
            boids = summary.boids,
            mean_speed = summary.mean_speed,
            "headless run finished"
        );
    }
    if let Some(path) = export {
        recorder
            .export_to_path(path)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

#[cfg(feature = "viewer")]
fn run_viewer(world: World, export_path: PathBuf) -> Result<()> {
    flocking::viewer::run(flocking::viewer::ViewerSetup { world, export_path });
    Ok(())
}

#[cfg(not(feature = "viewer"))]
fn run_viewer(_world: World, _export_path: PathBuf) -> Result<()> {
    anyhow::bail!("built without the `viewer` feature; pass --headless <TICKS> to run without a window")
}

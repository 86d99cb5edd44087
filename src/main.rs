use std::path::PathBuf;

use anyhow::{Context, Result};
use autodrive::simulation::evolution::{BrainFactory, Population};
use autodrive::simulation::manual::ManualSession;
use autodrive::simulation::params::{Mode, Params};
use autodrive::simulation::runner::GenerationRunner;
use autodrive::simulation::track::TrackModel;
use autodrive::simulation::vehicle::{Footprint, Vehicle};
use clap::Parser;
use tracing::{info, warn};

/// Evolve or manually drive cars around a raster race track.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Path to the JSON configuration file.
    config: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let params = Params::load_from_file(&cli.config)
        .with_context(|| format!("loading configuration {}", cli.config.display()))?;
    let track = TrackModel::load(&params.track_path, &params).context("loading track")?;
    let footprint = match &params.sprite_path {
        Some(path) => Footprint::from_sprite(path).context("loading vehicle sprite")?,
        None => Footprint::rect(params.body_length, params.body_width),
    };

    match params.mode {
        Mode::Evolve => evolve(&track, &params, footprint),
        Mode::Manual => drive(&track, &params, footprint),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn evolve(track: &TrackModel, params: &Params, footprint: Footprint) -> Result<()> {
    let mut population = Population::new(params);
    let mut runner = GenerationRunner::new(track, params, footprint, BrainFactory::new(params));

    info!(
        population = params.population_size,
        generations = params.generations,
        sensors = params.sensor_fan().len(),
        "Starting evolution",
    );

    for _ in 0..params.generations {
        let report = runner.run_generation(&mut population.genomes);

        if params
            .fitness_threshold
            .is_some_and(|threshold| report.best() as f64 >= threshold)
        {
            info!(
                generation = report.generation,
                best = report.best(),
                "Fitness threshold reached",
            );
            break;
        }
        if runner.generation() < params.generations {
            population.evolve(params);
        }
    }

    match (&params.best_genome_path, population.best()) {
        (Some(path), Some(best)) => {
            best.save_to_file(path)
                .with_context(|| format!("saving best genome to {}", path.display()))?;
            info!(path = %path.display(), fitness = best.fitness, "Saved best genome");
        }
        (Some(_), None) => warn!("Population is empty, no genome saved"),
        (None, _) => {}
    }
    Ok(())
}

fn drive(track: &TrackModel, params: &Params, footprint: Footprint) -> Result<()> {
    let mut session = ManualSession::new(track, Vehicle::spawn(params, footprint));
    info!("Reading keys from stdin, one line per tick (w/a/s/d)");

    let ticks = session
        .run(std::io::stdin().lock())
        .context("reading key input")?;

    if session.vehicle().is_alive() {
        info!(ticks, "Input ended");
    } else {
        warn!(ticks, "Car crashed into the track boundary");
    }
    Ok(())
}

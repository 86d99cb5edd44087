//! Outer loop glue: one harness run per generation.

use tracing::info;

use super::controller::{Controller, ControllerFactory};
use super::harness::{EvaluationHarness, GenerationReport};
use super::params::Params;
use super::track::TrackModel;
use super::vehicle::{Footprint, Vehicle};

/// Genome record owned by the generation driver that receives its fitness in place.
pub trait FitnessRecord {
    /// Stores the fitness reached by this genome in the last generation.
    fn set_fitness(&mut self, fitness: f64);
}

/// Evaluates successive generations on a fixed track.
pub struct GenerationRunner<'a, F> {
    track: &'a TrackModel,
    params: &'a Params,
    footprint: Footprint,
    factory: F,
    generation: u32,
}

impl<'a, F> GenerationRunner<'a, F>
where
    F: ControllerFactory,
    F::Genome: FitnessRecord,
{
    /// Creates a runner starting at generation 0.
    pub fn new(track: &'a TrackModel, params: &'a Params, footprint: Footprint, factory: F) -> Self {
        Self {
            track,
            params,
            footprint,
            factory,
            generation: 0,
        }
    }

    /// Index of the next generation to run.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Evaluates `genomes` and writes each one's fitness back onto it.
    pub fn run_generation(&mut self, genomes: &mut [F::Genome]) -> GenerationReport {
        let population: Vec<(Vehicle, Box<dyn Controller>)> = genomes
            .iter()
            .map(|genome| {
                (
                    Vehicle::spawn(self.params, self.footprint.clone()),
                    self.factory.build(genome),
                )
            })
            .collect();

        let harness =
            EvaluationHarness::new(self.track, population, self.generation, self.params.max_ticks);
        let report = harness.run();

        for (genome, &fitness) in genomes.iter_mut().zip(&report.fitness) {
            genome.set_fitness(fitness as f64);
        }

        info!(
            generation = report.generation,
            agents = report.fitness.len(),
            ticks = report.ticks,
            best = report.best(),
            mean = report.mean(),
            "Generation finished",
        );

        self.generation += 1;
        report
    }
}

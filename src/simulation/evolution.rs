//! Bundled population driver.
//!
//! Keeps a population of MLP genomes, hands them to the
//! [`GenerationRunner`](super::runner::GenerationRunner) and breeds the next
//! generation from the fitness written back onto each genome.

use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::brain::Brain;
use super::controller::{Controller, ControllerFactory, PolicyController};
use super::params::Params;
use super::runner::FitnessRecord;

/// Errors raised while saving or loading a genome.
#[derive(Debug, Error)]
pub enum GenomeIoError {
    /// The file could not be read or written.
    #[error("genome file {}: {source}", path.display())]
    Io {
        /// Path of the genome file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The genome could not be encoded or decoded.
    #[error("genome serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A policy network together with the fitness it last reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genome {
    /// Policy network.
    pub brain: Brain,
    /// Fitness from the last evaluation, 0 before the first one.
    pub fitness: f64,
}

impl Genome {
    /// Creates an unevaluated genome.
    pub fn new(brain: Brain) -> Self {
        Self {
            brain,
            fitness: 0.0,
        }
    }

    /// Saves the genome to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), GenomeIoError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| GenomeIoError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads a genome from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, GenomeIoError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| GenomeIoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl FitnessRecord for Genome {
    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

/// Builds [`PolicyController`]s from [`Genome`]s.
#[derive(Debug, Clone, Copy)]
pub struct BrainFactory {
    input_scale: f32,
    threshold: f32,
}

impl BrainFactory {
    /// Uses the input scale and decision threshold of `params`.
    pub fn new(params: &Params) -> Self {
        Self {
            input_scale: params.input_scale,
            threshold: params.decision_threshold,
        }
    }
}

impl ControllerFactory for BrainFactory {
    type Genome = Genome;

    fn build(&self, genome: &Genome) -> Box<dyn Controller> {
        Box::new(PolicyController::new(
            genome.brain.clone(),
            self.input_scale,
            self.threshold,
        ))
    }
}

/// Genomes evaluated together, one generation at a time.
#[derive(Debug, Clone)]
pub struct Population {
    /// Current genomes, evaluated in this order.
    pub genomes: Vec<Genome>,
}

impl Population {
    /// Creates `params.population_size` random genomes.
    pub fn new(params: &Params) -> Self {
        let layer_sizes = params.layer_sizes();
        let genomes = (0..params.population_size)
            .map(|_| Genome::new(Brain::new(&layer_sizes, params.init_scale)))
            .collect();
        Self { genomes }
    }

    /// Genome with the highest fitness.
    pub fn best(&self) -> Option<&Genome> {
        self.genomes
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }

    /// Replaces the population with offspring of the fittest genomes.
    ///
    /// The `elite_count` best genomes survive unchanged. The rest are bred
    /// from the top 15%: either a crossover of two parents or a clone of one,
    /// followed by mutation with a log-uniform sampled scale.
    pub fn evolve(&mut self, params: &Params) {
        let size = self.genomes.len();
        if size == 0 {
            return;
        }

        let mut ranked = std::mem::take(&mut self.genomes);
        ranked.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let top_count = ((size as f32 * 0.15) as usize).clamp(1, size);
        let mut rng = rand::rng();

        let mut next: Vec<Genome> = ranked
            .iter()
            .take(params.elite_count.min(size))
            .map(|elite| Genome::new(elite.brain.clone()))
            .collect();

        while next.len() < size {
            let parent_1 = &ranked[rng.random_range(0..top_count)];
            let mut brain = if top_count >= 2 && rng.random_bool(0.5) {
                let mut parent_2_idx = rng.random_range(0..top_count);
                while std::ptr::eq(&ranked[parent_2_idx], parent_1) {
                    parent_2_idx = rng.random_range(0..top_count);
                }
                let alpha = rng.random::<f32>();
                Brain::crossover_weighted(&parent_1.brain, &ranked[parent_2_idx].brain, alpha)
            } else {
                parent_1.brain.clone()
            };

            brain.mutate(sample_mutation_scale(&mut rng));
            next.push(Genome::new(brain));
        }

        self.genomes = next;
    }
}

/// Samples a mutation scale using logarithmic random distribution.
fn sample_mutation_scale(rng: &mut impl Rng) -> f32 {
    let min = 0.002f32;
    let max = 0.2f32;
    let log_mutation_scale = rng.random_range(min.ln()..max.ln());
    log_mutation_scale.exp()
}

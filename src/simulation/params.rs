use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sensor offsets used by evaluation runs, in degrees relative to heading.
pub const EVALUATION_FAN: [f32; 5] = [-60.0, -30.0, 0.0, 30.0, 60.0];

/// Sensor offsets used by manual drive sessions, in degrees relative to heading.
pub const DEBUG_FAN: [f32; 13] = [
    -180.0, -150.0, -120.0, -90.0, -60.0, -30.0, 0.0, 30.0, 60.0, 90.0, 120.0, 150.0, 180.0,
];

/// How the binary runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Evaluate and evolve a population of controllers.
    #[default]
    Evolve,
    /// Drive a single vehicle from keys read on stdin.
    Manual,
}

/// Errors raised while reading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read configuration {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid JSON for [`Params`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// The values parsed but cannot be simulated.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Simulation parameters for the track, the vehicles and the population driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Which entry point `main` runs.
    pub mode: Mode,
    /// Path of the track image.
    pub track_path: PathBuf,
    /// Simulation width in pixels. The track image is scaled to this.
    pub width: u32,
    /// Simulation height in pixels. The track image is scaled to this.
    pub height: u32,
    /// RGB colour of boundary pixels.
    pub boundary_color: [u8; 3],
    /// Maximum per-channel distance from `boundary_color` still counted as boundary.
    pub boundary_tolerance: u8,
    /// Optional sprite whose alpha mask becomes the collision footprint.
    pub sprite_path: Option<PathBuf>,
    /// Footprint length along the heading when no sprite is given.
    pub body_length: f32,
    /// Footprint width across the heading when no sprite is given.
    pub body_width: f32,
    /// Start position, x.
    pub start_x: f32,
    /// Start position, y.
    pub start_y: f32,
    /// Start heading in degrees.
    pub start_heading: f32,
    /// Distance travelled per tick at drive state 1.
    pub step_distance: f32,
    /// Heading change per tick while steering, in degrees.
    pub rotation_velocity: f32,
    /// Hard cap of a sensor ray, reported when nothing is hit.
    pub max_ray_length: u32,
    /// Sensor offsets in degrees. `None` picks the default fan of the mode.
    pub sensor_angles: Option<Vec<f32>>,
    /// Number of agents per generation.
    pub population_size: usize,
    /// Number of generations to evaluate.
    pub generations: u32,
    /// Tick budget per generation. `None` runs until every agent crashed.
    pub max_ticks: Option<u64>,
    /// Stop evolving once the best fitness reaches this value.
    pub fitness_threshold: Option<f64>,
    /// Hidden layer sizes of the policy network.
    pub hidden_layers: Vec<usize>,
    /// Range of the uniform initial weights.
    pub init_scale: f32,
    /// Factor applied to sensor readings before they reach the network.
    pub input_scale: f32,
    /// Output activation above which a steering channel fires.
    pub decision_threshold: f32,
    /// Genomes copied unchanged into the next generation.
    pub elite_count: usize,
    /// Where to write the best genome after the run.
    pub best_genome_path: Option<PathBuf>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            mode: Mode::Evolve,
            track_path: PathBuf::from("imgs/street_race.png"),
            width: 800,
            height: 700,
            boundary_color: [0, 0, 0],
            boundary_tolerance: 0,
            sprite_path: None,
            body_length: 40.0,
            body_width: 20.0,
            start_x: 300.0,
            start_y: 565.0,
            start_heading: 0.0,
            step_distance: 3.0,
            rotation_velocity: 2.0,
            max_ray_length: 200,
            sensor_angles: None,
            population_size: 30,
            generations: 50,
            max_ticks: Some(5_000),
            fitness_threshold: None,
            hidden_layers: vec![8],
            init_scale: 1.0,
            input_scale: 1.0 / 200.0,
            decision_threshold: 0.7,
            elite_count: 2,
            best_genome_path: None,
        }
    }
}

impl Params {
    /// Loads parameters from a JSON file and validates them.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let params: Self = serde_json::from_str(&json)?;
        params.validate()?;
        Ok(params)
    }

    /// Sensor offsets for this run: the configured list or the default fan of the mode.
    pub fn sensor_fan(&self) -> Vec<f32> {
        match (&self.sensor_angles, self.mode) {
            (Some(angles), _) => angles.clone(),
            (None, Mode::Evolve) => EVALUATION_FAN.to_vec(),
            (None, Mode::Manual) => DEBUG_FAN.to_vec(),
        }
    }

    /// Layer sizes of the policy network: one input per sensor, two steering outputs.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        sizes.push(self.sensor_fan().len());
        sizes.extend(self.hidden_layers.iter().copied());
        sizes.push(2);
        sizes
    }

    /// Rejects parameter combinations the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.width == 0 || self.height == 0 {
            return invalid("track width and height must be non-zero");
        }
        if self.sensor_fan().is_empty() {
            return invalid("sensor_angles must contain at least one angle");
        }
        if self.max_ray_length == 0 {
            return invalid("max_ray_length must be non-zero");
        }
        if self.sprite_path.is_none() && (self.body_length <= 0.0 || self.body_width <= 0.0) {
            return invalid("body_length and body_width must be positive");
        }
        if !(self.decision_threshold > 0.0 && self.decision_threshold < 1.0) {
            return invalid("decision_threshold must lie in (0, 1)");
        }
        if self.init_scale <= 0.0 {
            return invalid("init_scale must be positive");
        }
        if self.hidden_layers.contains(&0) {
            return invalid("hidden layers must not be empty");
        }
        if self.mode == Mode::Evolve {
            if self.population_size == 0 {
                return invalid("population_size must be non-zero");
            }
            if self.elite_count > self.population_size {
                return invalid("elite_count must not exceed population_size");
            }
        }
        Ok(())
    }
}

//! # Autodrive - Evolving Track Drivers
//!
//! Simulates 2D cars on a raster race track and scores control policies by
//! how long their car stays clear of the track boundary.
//!
//! ## Features
//!
//! - Binary occupancy track loaded from an image
//! - Constant-speed car kinematics with fixed-rate steering
//! - Ray-marched range sensors in a configurable fan
//! - Pixel-accurate collision of a rotated footprint (rectangle or sprite mask)
//! - Parallel generation harness with per-tick fitness
//! - Bundled MLP policy and truncation-selection population driver
//! - Manual driving session fed from stdin
//!
//! ## Core Modules
//!
//! - [`simulation::track`] - Occupancy grid and boundary queries
//! - [`simulation::vehicle`] - Kinematics, sensors and collision
//! - [`simulation::controller`] - Decision type and controller seam
//! - [`simulation::harness`] - Per-generation evaluation loop
//! - [`simulation::runner`] - Generation runner and fitness write-back

/// Core simulation logic and data structures.
pub mod simulation {
    /// Feed-forward policy network.
    pub mod brain;
    /// Steering decisions and the controller seam.
    pub mod controller;
    /// Bundled population driver (selection, crossover, mutation).
    pub mod evolution;
    /// Geometric helpers for headings, rotations and pixels.
    pub mod geometric_utils;
    /// Evaluation loop over one generation of agents.
    pub mod harness;
    /// Manual driving from key input.
    pub mod manual;
    /// Simulation parameters.
    pub mod params;
    /// Generation runner and fitness write-back.
    pub mod runner;
    /// Track occupancy grid.
    pub mod track;
    /// Vehicle kinematics, sensors and collision.
    pub mod vehicle;
}

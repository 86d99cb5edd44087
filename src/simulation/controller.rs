//! Seam between the simulation and whatever policy steers a vehicle.
//!
//! The harness only ever talks to [`Controller`]. Concrete policies are built
//! from opaque genome handles by a [`ControllerFactory`].

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::brain::Brain;

/// Steering decision applied to a vehicle for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Decision {
    /// Turn counter-clockwise on screen (heading increases).
    Left,
    /// Turn clockwise on screen (heading decreases).
    Right,
    /// Keep the current heading.
    #[default]
    Straight,
}

impl Decision {
    /// Signed steering direction: `Right` is +1, `Left` is -1.
    pub fn direction(self) -> i8 {
        match self {
            Decision::Right => 1,
            Decision::Left => -1,
            Decision::Straight => 0,
        }
    }

    /// Reads a decision off two network output channels.
    ///
    /// Channel 0 above `threshold` steers right, channel 1 above `threshold`
    /// steers left. Channel 1 is evaluated last and wins when both fire.
    pub fn from_outputs(outputs: &[f32], threshold: f32) -> Self {
        let mut decision = Decision::Straight;
        if outputs.first().is_some_and(|&o| o > threshold) {
            decision = Decision::Right;
        }
        if outputs.get(1).is_some_and(|&o| o > threshold) {
            decision = Decision::Left;
        }
        decision
    }
}

/// Maps a sensor vector to a steering decision.
///
/// Readings arrive in the vehicle's configured sensor order.
pub trait Controller: Send {
    /// Chooses the decision for the coming tick.
    fn decide(&mut self, readings: &Array1<f32>) -> Decision;
}

impl<F> Controller for F
where
    F: FnMut(&Array1<f32>) -> Decision + Send,
{
    fn decide(&mut self, readings: &Array1<f32>) -> Decision {
        self(readings)
    }
}

/// Builds controllers from genome handles supplied by the generation driver.
pub trait ControllerFactory {
    /// Opaque genome representation.
    type Genome;

    /// Creates the controller that evaluates `genome` for one generation.
    fn build(&self, genome: &Self::Genome) -> Box<dyn Controller>;
}

/// Adapter that drives a vehicle with a [`Brain`].
#[derive(Debug, Clone)]
pub struct PolicyController {
    brain: Brain,
    input_scale: f32,
    threshold: f32,
}

impl PolicyController {
    /// Wraps `brain`, scaling readings by `input_scale` before each forward pass.
    pub fn new(brain: Brain, input_scale: f32, threshold: f32) -> Self {
        Self {
            brain,
            input_scale,
            threshold,
        }
    }
}

impl Controller for PolicyController {
    fn decide(&mut self, readings: &Array1<f32>) -> Decision {
        let inputs = readings * self.input_scale;
        let outputs = self.brain.think(&inputs);
        Decision::from_outputs(outputs.as_slice().unwrap_or(&[]), self.threshold)
    }
}

//! Feed-forward policy network used by the bundled population driver.
//!
//! The simulation core never looks inside a [`Brain`]; it only sees the
//! [`Controller`](super::controller::Controller) built around it.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

pub mod mlp;

pub use mlp::Mlp;

/// Multi-layer perceptron with tanh activation on every layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brain {
    /// Ordered layers from input to output.
    pub layers: Vec<Mlp>,
}

impl Brain {
    /// Creates a brain with random weights.
    ///
    /// # Arguments
    ///
    /// * `layer_sizes` - Input size, hidden sizes, output size; at least two entries
    /// * `scale` - Range of the uniform initial weights
    pub fn new(layer_sizes: &[usize], scale: f32) -> Self {
        let layers = layer_sizes
            .windows(2)
            .map(|pair| Mlp::new_random(pair[0], pair[1], scale))
            .collect();

        Brain { layers }
    }

    /// Runs a forward pass through every layer.
    #[inline]
    pub fn think(&self, inputs: &Array1<f32>) -> Array1<f32> {
        let mut output = inputs.clone();
        for layer in &self.layers {
            output = layer.forward(&output);
        }
        output
    }

    /// Number of inputs the first layer expects.
    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, Mlp::input_size)
    }

    /// Number of outputs the last layer produces.
    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, Mlp::output_size)
    }

    /// Blends two parents layer by layer.
    ///
    /// Parents with different shapes yield a clone of `parent1`.
    pub fn crossover_weighted(parent1: &Brain, parent2: &Brain, weight1: f32) -> Self {
        let compatible = parent1.layers.len() == parent2.layers.len()
            && parent1
                .layers
                .iter()
                .zip(&parent2.layers)
                .all(|(a, b)| a.weights.dim() == b.weights.dim());
        if !compatible {
            return parent1.clone();
        }

        let layers = parent1
            .layers
            .iter()
            .zip(&parent2.layers)
            .map(|(layer1, layer2)| Mlp::crossover_weighted(layer1, layer2, weight1))
            .collect();
        Brain { layers }
    }

    /// Mutates all parameters in the brain.
    pub fn mutate(&mut self, mutation_scale: f32) {
        for layer in &mut self.layers {
            layer.mutate(mutation_scale);
        }
    }
}

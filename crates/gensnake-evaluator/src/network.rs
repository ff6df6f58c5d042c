//! Fixed-topology feed-forward network.
//!
//! Every layer appends a constant bias input of `-1` to the previous
//! activations, takes one dot product per node and squashes it with the
//! logistic sigmoid. There is no training by gradient; weights come only from
//! decoded genomes.

use crate::genome::{Genome, GenomeError, Topology, WeightSet, decode};

/// Value appended to every layer's inputs and multiplied by the bias weight.
pub const BIAS_INPUT: f64 = -1.0;

#[must_use]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Index of the largest output. Ties go to the lowest index.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn select_action(outputs: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in outputs.iter().enumerate() {
        if best.is_none_or(|(_, max)| value > max) {
            best = Some((index, value));
        }
    }
    best.map(|(index, _)| index)
}

#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
    topology: Topology,
    weights: WeightSet,
}

impl NeuralNetwork {
    pub fn from_genome(genome: &Genome, topology: &Topology) -> Result<Self, GenomeError> {
        Ok(Self {
            topology: *topology,
            weights: decode(genome, topology)?,
        })
    }

    /// Wraps weights that were already checked against `topology`.
    pub fn from_weights(weights: WeightSet, topology: &Topology) -> Result<Self, GenomeError> {
        let weights = WeightSet::from_layers(weights.layers().clone(), topology)?;
        Ok(Self {
            topology: *topology,
            weights,
        })
    }

    #[must_use]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[must_use]
    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }

    /// Runs a forward pass and returns one activation per output node.
    pub fn forward(&self, inputs: &[f64]) -> Result<Vec<f64>, GenomeError> {
        if inputs.len() != self.topology.inputs {
            return Err(GenomeError::InputMismatch {
                expected: self.topology.inputs,
                actual: inputs.len(),
            });
        }
        let mut activations = inputs.to_vec();
        for layer in self.weights.layers() {
            activations.push(BIAS_INPUT);
            activations = layer
                .iter()
                .map(|node| {
                    let sum = node
                        .iter()
                        .zip(&activations)
                        .map(|(w, a)| w * a)
                        .sum::<f64>();
                    sigmoid(sum)
                })
                .collect();
        }
        Ok(activations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn test_sigmoid() {
        assert_close(sigmoid(0.0), 0.5);
        assert!(sigmoid(40.0) > 0.999_999);
        assert!(sigmoid(-40.0) < 1e-6);
        assert_eq!(sigmoid(-1000.0), 0.0);
    }

    #[test]
    fn test_select_action_first_max_wins() {
        assert_eq!(select_action(&[0.1, 0.9, 0.9, 0.2]), Some(1));
        assert_eq!(select_action(&[0.5, 0.5, 0.5, 0.5]), Some(0));
        assert_eq!(select_action(&[0.0, 0.0, 0.0, 1.0]), Some(3));
        assert_eq!(select_action(&[]), None);
    }

    #[test]
    fn test_forward_hand_computed() {
        let topology = Topology::new(8, 1, 1, 1).unwrap();
        // Every node: weight 1 on its single input, bias weight 0.
        let layers = [vec![vec![1.0, 0.0]], vec![vec![1.0, 0.0]], vec![vec![1.0, 0.0]]];
        let weights = WeightSet::from_layers(layers, &topology).unwrap();
        let network = NeuralNetwork::from_weights(weights, &topology).unwrap();
        let out = network.forward(&[0.0]).unwrap();
        assert_eq!(out.len(), 1);
        assert_close(out[0], sigmoid(sigmoid(0.5)));
    }

    #[test]
    fn test_forward_bias_is_negative_one() {
        let topology = Topology::new(8, 1, 1, 1).unwrap();
        // Only the final bias weight is set, so the output is sigmoid(2 * -1).
        let layers = [vec![vec![0.0, 0.0]], vec![vec![0.0, 0.0]], vec![vec![0.0, 2.0]]];
        let weights = WeightSet::from_layers(layers, &topology).unwrap();
        let network = NeuralNetwork::from_weights(weights, &topology).unwrap();
        assert_close(network.forward(&[123.0]).unwrap()[0], sigmoid(-2.0));
    }

    #[test]
    fn test_forward_rejects_wrong_input_count() {
        let topology = Topology::default();
        let network =
            NeuralNetwork::from_genome(&Genome::zeros(topology.genome_len()), &topology).unwrap();
        assert_eq!(
            network.forward(&[0.0; 3]),
            Err(GenomeError::InputMismatch {
                expected: 9,
                actual: 3
            })
        );
        assert_eq!(network.forward(&[0.0; 9]).unwrap().len(), 4);
    }
}

//! Bit-string genomes and their decoding into network weights.
//!
//! A genome is a flat sequence of bits. It is read in consecutive chunks of
//! `bits_per_weight` bits, most significant bit first, and each chunk maps to
//! one weight:
//!
//! ```text
//! weight = int(chunk) * 3 / 2^(bits_per_weight - 1) - 3
//! ```
//!
//! which covers `[-3, 3)` in steps of `3 / 2^(bits_per_weight - 1)`.
//!
//! Weights are consumed layer by layer (input to hidden, hidden to hidden,
//! hidden to output), node by node, and within a node one weight per input
//! followed by one bias weight.
//!
//! ```
//! use gensnake_evaluator::genome::{Genome, Topology, decode, encode};
//!
//! let topology = Topology::new(4, 2, 2, 1).unwrap();
//! let genome = Genome::zeros(topology.genome_len());
//! let weights = decode(&genome, &topology).unwrap();
//! assert!(weights.iter().all(|w| w == -3.0));
//! assert_eq!(encode(&weights, &topology).unwrap(), genome);
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lowest decodable weight.
pub const WEIGHT_MIN: f64 = -3.0;
/// Exclusive upper bound of decodable weights.
pub const WEIGHT_MAX: f64 = 3.0;

/// Largest supported chunk width.
pub const MAX_BITS_PER_WEIGHT: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GenomeError {
    #[display("genome has {actual} bits but the topology needs {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[display("invalid topology: {reason}")]
    InvalidTopology { reason: &'static str },
    #[display("network expects {expected} inputs, got {actual}")]
    InputMismatch { expected: usize, actual: usize },
    #[display("invalid bit {found:?} at position {position}")]
    InvalidBit { position: usize, found: char },
    #[display("layer {layer} has {actual} weights but the topology needs {expected}")]
    ShapeMismatch {
        layer: usize,
        expected: usize,
        actual: usize,
    },
}

/// Fixed network shape: one input layer, two hidden layers of equal width
/// and one output layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub bits_per_weight: usize,
    pub inputs: usize,
    pub hidden: usize,
    pub outputs: usize,
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            bits_per_weight: 8,
            inputs: 9,
            hidden: 10,
            outputs: 4,
        }
    }
}

impl Topology {
    pub fn new(
        bits_per_weight: usize,
        inputs: usize,
        hidden: usize,
        outputs: usize,
    ) -> Result<Self, GenomeError> {
        let topology = Self {
            bits_per_weight,
            inputs,
            hidden,
            outputs,
        };
        topology.validate()?;
        Ok(topology)
    }

    pub fn validate(&self) -> Result<(), GenomeError> {
        let reason = if self.bits_per_weight == 0 {
            "bits per weight must be positive"
        } else if self.bits_per_weight > MAX_BITS_PER_WEIGHT {
            "bits per weight must be at most 32"
        } else if self.inputs == 0 || self.hidden == 0 || self.outputs == 0 {
            "every layer needs at least one node"
        } else {
            return Ok(());
        };
        Err(GenomeError::InvalidTopology { reason })
    }

    /// `(nodes, inputs per node)` for each of the three weight layers.
    /// Every node additionally has one bias weight.
    #[must_use]
    pub const fn layer_shapes(&self) -> [(usize, usize); 3] {
        [
            (self.hidden, self.inputs),
            (self.hidden, self.hidden),
            (self.outputs, self.hidden),
        ]
    }

    #[must_use]
    pub fn weight_count(&self) -> usize {
        self.layer_shapes()
            .iter()
            .map(|&(nodes, fan_in)| nodes * (fan_in + 1))
            .sum()
    }

    #[must_use]
    pub fn genome_len(&self) -> usize {
        self.weight_count() * self.bits_per_weight
    }
}

/// An immutable bit string.
///
/// Displays and serializes as a string of `0` and `1` characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Genome {
    bits: Vec<bool>,
}

impl Genome {
    #[must_use]
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    #[must_use]
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of positions at which two genomes differ, or `None` if their
    /// lengths differ.
    #[must_use]
    pub fn hamming_distance(&self, other: &Self) -> Option<usize> {
        (self.len() == other.len()).then(|| {
            self.bits
                .iter()
                .zip(&other.bits)
                .filter(|(a, b)| a != b)
                .count()
        })
    }
}

impl FromIterator<bool> for Genome {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Genome {
    type Err = GenomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .enumerate()
            .map(|(position, c)| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                found => Err(GenomeError::InvalidBit { position, found }),
            })
            .collect()
    }
}

impl Serialize for Genome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Genome {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Decoded weights, grouped as `layers[layer][node][input]`.
///
/// The last entry of each node is its bias weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSet {
    layers: [Vec<Vec<f64>>; 3],
}

impl WeightSet {
    /// Builds a weight set from explicit layers, checking them against `topology`.
    pub fn from_layers(
        layers: [Vec<Vec<f64>>; 3],
        topology: &Topology,
    ) -> Result<Self, GenomeError> {
        for (layer, (nodes, &(expected_nodes, fan_in))) in
            layers.iter().zip(&topology.layer_shapes()).enumerate()
        {
            let expected = expected_nodes * (fan_in + 1);
            let actual: usize = nodes.iter().map(Vec::len).sum();
            let well_formed =
                nodes.len() == expected_nodes && nodes.iter().all(|n| n.len() == fan_in + 1);
            if !well_formed {
                return Err(GenomeError::ShapeMismatch {
                    layer,
                    expected,
                    actual,
                });
            }
        }
        Ok(Self { layers })
    }

    #[must_use]
    pub fn layers(&self) -> &[Vec<Vec<f64>>; 3] {
        &self.layers
    }

    /// All weights in genome order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.layers.iter().flatten().flatten().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.iter().flatten().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[expect(clippy::cast_precision_loss)]
fn chunk_to_weight(chunk: &[bool]) -> f64 {
    let code = chunk
        .iter()
        .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit));
    let step = 3.0 / (1u64 << (chunk.len() - 1)) as f64;
    code as f64 * step + WEIGHT_MIN
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn weight_to_chunk(weight: f64, bits: usize, out: &mut Vec<bool>) {
    let max_code = (1u64 << bits) - 1;
    let scale = (1u64 << (bits - 1)) as f64 / 3.0;
    let code = ((weight - WEIGHT_MIN) * scale)
        .round()
        .clamp(0.0, max_code as f64) as u64;
    out.extend((0..bits).rev().map(|shift| (code >> shift) & 1 == 1));
}

/// Maps a genome to network weights.
///
/// Fails with [`GenomeError::LengthMismatch`] unless the genome length is
/// exactly [`Topology::genome_len`].
pub fn decode(genome: &Genome, topology: &Topology) -> Result<WeightSet, GenomeError> {
    topology.validate()?;
    let expected = topology.genome_len();
    if genome.len() != expected {
        return Err(GenomeError::LengthMismatch {
            expected,
            actual: genome.len(),
        });
    }

    let mut weights = genome
        .bits()
        .chunks_exact(topology.bits_per_weight)
        .map(chunk_to_weight);
    let mut layers: [Vec<Vec<f64>>; 3] = Default::default();
    for (layer, (nodes, fan_in)) in layers.iter_mut().zip(topology.layer_shapes()) {
        for _ in 0..nodes {
            layer.push(weights.by_ref().take(fan_in + 1).collect());
        }
    }
    debug_assert!(weights.next().is_none());
    Ok(WeightSet { layers })
}

/// Inverse of [`decode`]: quantizes each weight to the nearest code.
///
/// Weights outside `[-3, 3)` saturate to the lowest or highest code.
pub fn encode(weights: &WeightSet, topology: &Topology) -> Result<Genome, GenomeError> {
    topology.validate()?;
    let checked = WeightSet::from_layers(weights.layers.clone(), topology)?;
    let mut bits = Vec::with_capacity(topology.genome_len());
    for weight in checked.iter() {
        weight_to_chunk(weight, topology.bits_per_weight, &mut bits);
    }
    Ok(Genome { bits })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn small() -> Topology {
        Topology::new(3, 2, 2, 1).unwrap()
    }

    #[test]
    fn test_default_topology_size() {
        let t = Topology::default();
        // 10*(9+1) + 10*(10+1) + 4*(10+1)
        assert_eq!(t.weight_count(), 254);
        assert_eq!(t.genome_len(), 2032);
    }

    #[test]
    fn test_invalid_topology() {
        assert!(Topology::new(0, 9, 10, 4).is_err());
        assert!(Topology::new(33, 9, 10, 4).is_err());
        assert!(Topology::new(8, 0, 10, 4).is_err());
        assert!(Topology::new(8, 9, 10, 0).is_err());
    }

    #[test]
    fn test_chunk_values() {
        assert_eq!(chunk_to_weight(&[false, false, false]), -3.0);
        assert_eq!(chunk_to_weight(&[true, false, false]), 0.0);
        assert_eq!(chunk_to_weight(&[true, true, true]), 2.25);
        assert_eq!(chunk_to_weight(&[true]), 0.0);
        assert_eq!(chunk_to_weight(&[false]), -3.0);
    }

    #[test]
    fn test_decode_layer_layout() {
        let t = small();
        // layer 0: 2 nodes x 3, layer 1: 2 nodes x 3, layer 2: 1 node x 3
        let genome: Genome = (0..t.genome_len()).map(|i| i < 3).collect();
        let weights = decode(&genome, &t).unwrap();
        let layers = weights.layers();
        assert_eq!(layers[0].len(), 2);
        assert_eq!(layers[1].len(), 2);
        assert_eq!(layers[2].len(), 1);
        assert!(layers.iter().flatten().all(|node| node.len() == 3));
        assert_eq!(layers[0][0][0], 2.25);
        assert_eq!(layers[0][0][1], -3.0);
        assert_eq!(weights.len(), 15);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let t = small();
        let err = decode(&Genome::zeros(t.genome_len() + 1), &t).unwrap_err();
        assert_eq!(
            err,
            GenomeError::LengthMismatch {
                expected: 45,
                actual: 46
            }
        );
    }

    #[test]
    fn test_encode_saturates() {
        let t = Topology::new(2, 1, 1, 1).unwrap();
        let layers = [vec![vec![10.0, -10.0]], vec![vec![0.0, 1.4]], vec![vec![-1.4, 2.9]]];
        let weights = WeightSet::from_layers(layers, &t).unwrap();
        let genome = encode(&weights, &t).unwrap();
        assert_eq!(genome.to_string(), "110010110111");
    }

    #[test]
    fn test_from_layers_rejects_bad_shape() {
        let t = Topology::new(2, 1, 1, 1).unwrap();
        let layers = [vec![vec![0.0]], vec![vec![0.0, 0.0]], vec![vec![0.0, 0.0]]];
        assert!(matches!(
            WeightSet::from_layers(layers, &t),
            Err(GenomeError::ShapeMismatch { layer: 0, .. })
        ));
    }

    #[test]
    fn test_parse_and_display() {
        let genome: Genome = "10110".parse().unwrap();
        assert_eq!(genome.bits(), &[true, false, true, true, false]);
        assert_eq!(genome.to_string(), "10110");
        assert_eq!(
            "10x1".parse::<Genome>(),
            Err(GenomeError::InvalidBit {
                position: 2,
                found: 'x'
            })
        );
        let json = serde_json::to_string(&genome).unwrap();
        assert_eq!(json, "\"10110\"");
        assert_eq!(serde_json::from_str::<Genome>(&json).unwrap(), genome);
    }

    #[test]
    fn test_hamming_distance() {
        let a: Genome = "0000".parse().unwrap();
        let b: Genome = "0110".parse().unwrap();
        assert_eq!(a.hamming_distance(&b), Some(2));
        assert_eq!(a.hamming_distance(&a), Some(0));
        let short: Genome = "011".parse().unwrap();
        assert_eq!(a.hamming_distance(&short), None);
    }

    proptest! {
        #[test]
        fn prop_decode_count_and_range(
            bits_per_weight in 1usize..=12,
            bits in proptest::collection::vec(any::<bool>(), 0..4000),
        ) {
            let t = Topology::new(bits_per_weight, 3, 2, 2).unwrap();
            let genome: Genome = bits.into_iter().cycle().take(t.genome_len()).collect();
            prop_assume!(genome.len() == t.genome_len());
            let weights = decode(&genome, &t).unwrap();
            prop_assert_eq!(weights.len(), t.weight_count());
            prop_assert!(weights.iter().all(|w| (WEIGHT_MIN..WEIGHT_MAX).contains(&w)));
            prop_assert_eq!(encode(&weights, &t).unwrap(), genome);
        }
    }
}

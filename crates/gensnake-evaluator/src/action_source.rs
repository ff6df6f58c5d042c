//! Sources of per-frame movement decisions.
//!
//! The simulation loop only asks an [`ActionSource`] for the next direction.
//! [`NeuralPolicy`] drives training and replays, [`ManualInput`] is fed by a
//! human front end and [`ScriptedPolicy`] replays a fixed move list.

use std::collections::VecDeque;

use gensnake_engine::{Direction, GameState};

use crate::{
    features::{self, FEATURE_COUNT},
    genome::{Genome, GenomeError, Topology},
    network::{NeuralNetwork, select_action},
};

pub trait ActionSource {
    fn next_direction(&mut self, game: &GameState) -> Direction;
}

impl<A: ActionSource + ?Sized> ActionSource for Box<A> {
    fn next_direction(&mut self, game: &GameState) -> Direction {
        (**self).next_direction(game)
    }
}

impl<A: ActionSource + ?Sized> ActionSource for &mut A {
    fn next_direction(&mut self, game: &GameState) -> Direction {
        (**self).next_direction(game)
    }
}

/// Direction used before the snake has moved and nothing else is known.
pub const DEFAULT_DIRECTION: Direction = Direction::Right;

/// Plays by running the decoded network on the extracted features.
#[derive(Debug, Clone)]
pub struct NeuralPolicy {
    network: NeuralNetwork,
}

impl NeuralPolicy {
    /// Decodes `genome` for a topology that matches the feature extractor.
    pub fn new(genome: &Genome, topology: &Topology) -> Result<Self, GenomeError> {
        Self::check_topology(topology)?;
        Ok(Self {
            network: NeuralNetwork::from_genome(genome, topology)?,
        })
    }

    pub fn from_network(network: NeuralNetwork) -> Result<Self, GenomeError> {
        Self::check_topology(network.topology())?;
        Ok(Self { network })
    }

    /// Fails unless the topology takes [`FEATURE_COUNT`] inputs and has one
    /// output per direction.
    pub fn check_topology(topology: &Topology) -> Result<(), GenomeError> {
        topology.validate()?;
        if topology.inputs != FEATURE_COUNT {
            return Err(GenomeError::InputMismatch {
                expected: FEATURE_COUNT,
                actual: topology.inputs,
            });
        }
        if topology.outputs != Direction::ALL.len() {
            return Err(GenomeError::InvalidTopology {
                reason: "policy networks need exactly four outputs",
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    /// Network outputs for the current state, ordered Left, Up, Right, Down.
    #[must_use]
    pub fn outputs(&self, game: &GameState) -> Vec<f64> {
        let inputs = features::extract(game);
        // Input count is checked at construction.
        self.network.forward(&inputs).unwrap_or_default()
    }
}

impl ActionSource for NeuralPolicy {
    fn next_direction(&mut self, game: &GameState) -> Direction {
        select_action(&self.outputs(game))
            .and_then(Direction::from_index)
            .unwrap_or(DEFAULT_DIRECTION)
    }
}

/// Queued human input.
///
/// Consumes one queued direction per frame. When the queue is empty the snake
/// keeps moving the way it moved last, or [`DEFAULT_DIRECTION`] before the
/// first move.
#[derive(Debug, Clone, Default)]
pub struct ManualInput {
    pending: VecDeque<Direction>,
}

impl ManualInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, direction: Direction) {
        self.pending.push_back(direction);
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl ActionSource for ManualInput {
    fn next_direction(&mut self, game: &GameState) -> Direction {
        self.pending
            .pop_front()
            .or_else(|| game.head_direction())
            .unwrap_or(DEFAULT_DIRECTION)
    }
}

/// Replays a fixed move list, cycling when it runs out.
#[derive(Debug, Clone)]
pub struct ScriptedPolicy {
    moves: Vec<Direction>,
    cursor: usize,
}

impl ScriptedPolicy {
    #[must_use]
    pub fn new(moves: Vec<Direction>) -> Self {
        Self { moves, cursor: 0 }
    }

    #[must_use]
    pub fn constant(direction: Direction) -> Self {
        Self::new(vec![direction])
    }
}

impl ActionSource for ScriptedPolicy {
    fn next_direction(&mut self, game: &GameState) -> Direction {
        if self.moves.is_empty() {
            return game.head_direction().unwrap_or(DEFAULT_DIRECTION);
        }
        let direction = self.moves[self.cursor % self.moves.len()];
        self.cursor += 1;
        direction
    }
}

#[cfg(test)]
mod tests {
    use gensnake_engine::{Cell, FruitSeed, GameConfig};

    use super::*;

    fn game() -> GameState {
        GameState::with_layout(
            GameConfig::new(6, 6),
            vec![Cell::new(3, 3)],
            vec![],
            Cell::new(0, 0),
            FruitSeed::from_u64(9),
        )
        .unwrap()
    }

    #[test]
    fn test_manual_input_defaults_then_keeps_heading() {
        let mut game = game();
        let mut input = ManualInput::new();
        assert_eq!(input.next_direction(&game), Direction::Right);

        input.push(Direction::Down);
        input.push(Direction::Left);
        let d = input.next_direction(&game);
        assert_eq!(d, Direction::Down);
        game.tick(d).unwrap();
        let d = input.next_direction(&game);
        assert_eq!(d, Direction::Left);
        game.tick(d).unwrap();
        assert_eq!(input.next_direction(&game), Direction::Left);
        assert_eq!(input.pending(), 0);
    }

    #[test]
    fn test_scripted_policy_cycles() {
        let game = game();
        let mut script = ScriptedPolicy::new(vec![Direction::Up, Direction::Left]);
        let moves: Vec<_> = (0..5).map(|_| script.next_direction(&game)).collect();
        assert_eq!(
            moves,
            vec![
                Direction::Up,
                Direction::Left,
                Direction::Up,
                Direction::Left,
                Direction::Up
            ]
        );
        assert_eq!(
            ScriptedPolicy::new(vec![]).next_direction(&game),
            Direction::Right
        );
    }

    #[test]
    fn test_neural_policy_rejects_foreign_topology() {
        let topology = Topology::new(4, 5, 3, 4).unwrap();
        let genome = Genome::zeros(topology.genome_len());
        assert!(matches!(
            NeuralPolicy::new(&genome, &topology),
            Err(GenomeError::InputMismatch {
                expected: 9,
                actual: 5
            })
        ));
        let topology = Topology::new(4, 9, 3, 2).unwrap();
        assert!(matches!(
            NeuralPolicy::new(&Genome::zeros(topology.genome_len()), &topology),
            Err(GenomeError::InvalidTopology { .. })
        ));
    }

    #[test]
    fn test_uniform_outputs_pick_left() {
        let topology = Topology::default();
        let mut policy = NeuralPolicy::new(&Genome::zeros(topology.genome_len()), &topology).unwrap();
        assert_eq!(policy.next_direction(&game()), Direction::Left);
    }

    #[test]
    fn test_boxed_source() {
        let mut source: Box<dyn ActionSource> = Box::new(ScriptedPolicy::constant(Direction::Down));
        assert_eq!(source.next_direction(&game()), Direction::Down);
    }
}

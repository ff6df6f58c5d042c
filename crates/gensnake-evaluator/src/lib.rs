//! Neural policy and fitness evaluation for snake games.
//!
//! This crate turns a bit-string [`genome::Genome`] into a playing snake and
//! scores how well it played:
//!
//! 1. **Decode** ([`genome`]) - Split the genome into fixed-width chunks and
//!    map each chunk to a weight in `[-3, 3)`.
//! 2. **Perceive** ([`features`]) - Extract nine inputs from the game state.
//! 3. **Act** ([`network`], [`action_source`]) - Run the fixed-topology
//!    network and take the direction with the highest output.
//! 4. **Score** ([`session`], [`fitness`]) - Play a whole game and reduce its
//!    statistics to a single fitness value.
//!
//! ```text
//! Genome --decode--> WeightSet --forward--> outputs --argmax--> Direction
//!                                   ^
//!                     GameState --features
//! ```
//!
//! # Example
//!
//! ```
//! use gensnake_engine::{FruitSeed, GameConfig, GameState};
//! use gensnake_evaluator::{
//!     action_source::NeuralPolicy,
//!     fitness::{FitnessFunction as _, FoodSeekingFitness},
//!     genome::{Genome, Topology},
//!     session::Session,
//! };
//!
//! let topology = Topology::default();
//! let genome = Genome::zeros(topology.genome_len());
//! let policy = NeuralPolicy::new(&genome, &topology).unwrap();
//! let game = GameState::new(GameConfig::default(), FruitSeed::from_u64(1)).unwrap();
//!
//! let stats = Session::new(game, policy, None).play().unwrap();
//! let record = FoodSeekingFitness::default().record(&stats);
//! assert!(record.fitness > 0.0);
//! ```

pub mod action_source;
pub mod features;
pub mod fitness;
pub mod genome;
pub mod network;
pub mod session;

//! Training system that evolves snake-playing networks with a genetic algorithm.
//!
//! # How Training Works
//!
//! 1. **Population** - Start from random bit-string genomes (or a saved snapshot)
//! 2. **Evaluation** - Each genome plays one game on its own fruit seed
//! 3. **Fitness** - The session is scored by [`FoodSeekingFitness`](gensnake_evaluator::fitness::FoodSeekingFitness)
//! 4. **Reproduction** - Elitism, roulette selection, crossover and mutation
//!    build the next generation ([`genetic`])
//! 5. **Reporting** - Observers receive a [`GenerationSummary`](orchestrator::GenerationSummary)
//!    and the new population; [`artifact`] writes them to disk
//!
//! # Architecture
//!
//! ```text
//! Trainer (orchestrator)
//!     ↓ drives
//! Session<NeuralPolicy> (gensnake-evaluator)
//!     ↓ ticks
//! GameState (gensnake-engine)
//!
//! Trainer ── GenerationSummary ──> ArtifactWriter thread ──> log + snapshots
//! ```
//!
//! # Determinism
//!
//! All randomness flows from one master generator. Each genome's fruit seed is
//! drawn from it, in population order, when its evaluation starts, and the
//! evolver draws from it afterwards. A run is therefore reproducible from its
//! seed, whether genomes are evaluated one tick at a time or in parallel.

use std::io;

use gensnake_engine::LogicFault;
use gensnake_evaluator::genome::GenomeError;

use crate::genetic::SelectionError;

pub mod artifact;
pub mod bits;
pub mod config;
pub mod genetic;
pub mod orchestrator;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TrainingError {
    #[display("invalid training configuration: {reason}")]
    Config { reason: String },
    #[display("genome {genome} of generation {generation} is malformed")]
    MalformedGenome {
        generation: usize,
        genome: usize,
        source: GenomeError,
    },
    #[display("parent selection failed in generation {generation}")]
    Selection {
        generation: usize,
        source: SelectionError,
    },
    #[display("simulation fault while evaluating genome {genome} of generation {generation}")]
    Simulation {
        generation: usize,
        genome: usize,
        source: LogicFault,
    },
    #[display("failed to record generation {generation}")]
    Artifact { generation: usize, source: io::Error },
}

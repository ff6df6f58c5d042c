//! Game state and frame progression.
//!
//! - [`GameState`] - Board, snake body, fruit and per-game counters
//! - [`GameConfig`] - Board dimensions and idle limits
//! - [`FruitSeed`] - Seed for deterministic fruit placement
//! - [`StepOutcome`] - Result of advancing one frame
//!
//! # Frame Order
//!
//! [`GameState::tick`] performs, in order: movement, the `frames_alive`
//! increment, the fruit check, the wall check, the body check, the
//! `frames_since_fruit` increment and the idle check. The first terminal
//! condition found ends the game.

pub use self::{fruit_seed::*, game_config::*, game_state::*};

mod fruit_seed;
mod game_config;
mod game_state;

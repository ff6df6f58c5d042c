//! Grid snake simulation.
//!
//! The engine owns the board, the snake body and the fruit placement stream.
//! It knows nothing about neural networks or genetic algorithms: callers feed
//! it one [`Direction`] per frame through [`GameState::tick`] and inspect the
//! resulting [`StepOutcome`].
//!
//! ```
//! use gensnake_engine::{Direction, FruitSeed, GameConfig, GameState};
//!
//! let mut game = GameState::new(GameConfig::default(), FruitSeed::from_u64(7)).unwrap();
//! let outcome = game.tick(Direction::Right).unwrap();
//! assert!(outcome.is_alive());
//! assert_eq!(game.frames_alive(), 1);
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Internal invariant violation detected by the simulation.
///
/// These never arise from legal input. They indicate a bug in the engine and
/// are reported instead of silently producing a corrupted body.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum LogicFault {
    #[display("segment {segment} has no queued direction ({queued} queued for {body_len} segments)")]
    DirectionQueueDesync {
        segment: usize,
        queued: usize,
        body_len: usize,
    },
    #[display("direction queue holds {queued} entries for a body of {body_len} segments")]
    DirectionQueueOverflow { queued: usize, body_len: usize },
}

/// Rejected board dimensions or caller-supplied layout.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum LayoutError {
    #[display("board must be at least 1x1 and fit in i32 coordinates, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
    #[display("snake body must contain at least one segment")]
    EmptyBody,
    #[display("cell {cell} lies outside the board")]
    OutOfBounds { cell: Cell },
    #[display("cell {cell} is occupied by more than one segment")]
    OverlappingBody { cell: Cell },
    #[display("segments {index} and {next} are not orthogonally adjacent")]
    DisconnectedBody { index: usize, next: usize },
    #[display("fruit at {cell} overlaps the snake body")]
    FruitInBody { cell: Cell },
    #[display("{directions} queued directions cannot describe a body of {body_len} segments")]
    DirectionCount { directions: usize, body_len: usize },
    #[display("segment {index} moving {direction} does not reach segment {}", index - 1)]
    MisalignedDirection { index: usize, direction: Direction },
}

use serde::{Deserialize, Serialize};

use crate::{Cell, LayoutError};

/// Board dimensions and idle limits for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub idle: IdleLimits,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 10,
            idle: IdleLimits::default(),
        }
    }
}

impl GameConfig {
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            idle: IdleLimits::DEFAULT,
        }
    }

    #[must_use]
    pub const fn with_idle(mut self, idle: IdleLimits) -> Self {
        self.idle = idle;
        self
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let fits = |n: usize| n >= 1 && i32::try_from(n).is_ok();
        let area_fits = self
            .rows
            .checked_mul(self.cols)
            .is_some_and(|area| i32::try_from(area).is_ok());
        if !fits(self.rows) || !fits(self.cols) || !area_fits {
            return Err(LayoutError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Spawn cell of a fresh snake.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn center(&self) -> Cell {
        Cell::new((self.rows / 2) as i32, (self.cols / 2) as i32)
    }

    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.index_of(cell).is_some()
    }

    /// Row-major index of `cell`, or `None` when it lies off the board.
    #[must_use]
    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        let row = usize::try_from(cell.row).ok()?;
        let col = usize::try_from(cell.col).ok()?;
        (row < self.rows && col < self.cols).then_some(row * self.cols + col)
    }

    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn cell_at(&self, index: usize) -> Cell {
        Cell::new((index / self.cols) as i32, (index % self.cols) as i32)
    }
}

/// Frames a snake may go without eating before the game ends.
///
/// A non-positive bound disables that rule. The short bound only applies
/// while the score is below `short_score_cutoff`, so snakes that have never
/// learned to eat are culled early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdleLimits {
    pub long_bound: i64,
    pub short_bound: i64,
    pub short_score_cutoff: usize,
}

impl Default for IdleLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl IdleLimits {
    pub const DEFAULT: Self = Self {
        long_bound: 250,
        short_bound: 50,
        short_score_cutoff: 6,
    };

    pub const UNBOUNDED: Self = Self {
        long_bound: 0,
        short_bound: 0,
        short_score_cutoff: 0,
    };

    #[must_use]
    pub const fn long_only(bound: i64) -> Self {
        Self {
            long_bound: bound,
            short_bound: 0,
            short_score_cutoff: 0,
        }
    }

    /// Whether a snake with `score` that has gone `frames_since_fruit`
    /// frames without eating has run out of time.
    #[must_use]
    pub fn is_exceeded(&self, frames_since_fruit: usize, score: usize) -> bool {
        let frames = i64::try_from(frames_since_fruit).unwrap_or(i64::MAX);
        let long = self.long_bound > 0 && frames >= self.long_bound;
        let short =
            self.short_bound > 0 && frames >= self.short_bound && score < self.short_score_cutoff;
        long || short
    }

    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.long_bound > 0
    }
}

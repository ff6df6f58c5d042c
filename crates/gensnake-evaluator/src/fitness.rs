//! Session fitness.
//!
//! The training objective rewards eating above all and survival second:
//!
//! ```text
//! fitness = max(2 * score, 1)^2 * frame_term^1.5
//!
//! frame_term = max(frames_alive - frames_since_fruit, 1)  if frames_since_fruit >= starvation_window
//!            = max(frames_alive, 1)                       otherwise
//! ```
//!
//! The starvation rule drops the frames spent wandering since the last fruit,
//! so a snake that eats and then circles until the idle limit gains nothing
//! from the circling. Both factors are at least 1, so fitness is always
//! positive and roulette selection never sees a zero total.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::SessionStats;

/// Fitness of one evaluated genome together with the stats it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessRecord {
    pub fitness: f64,
    pub score: usize,
    pub frames_alive: usize,
}

pub trait FitnessFunction: fmt::Debug + Send + Sync {
    fn fitness(&self, stats: &SessionStats) -> f64;

    fn record(&self, stats: &SessionStats) -> FitnessRecord {
        FitnessRecord {
            fitness: self.fitness(stats),
            score: stats.score,
            frames_alive: stats.frames_alive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodSeekingFitness {
    pub starvation_window: usize,
}

impl Default for FoodSeekingFitness {
    fn default() -> Self {
        Self {
            starvation_window: Self::DEFAULT_STARVATION_WINDOW,
        }
    }
}

impl FoodSeekingFitness {
    pub const DEFAULT_STARVATION_WINDOW: usize = 50;

    #[must_use]
    pub const fn new(starvation_window: usize) -> Self {
        Self { starvation_window }
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn compute(&self, score: usize, frames_alive: usize, frames_since_fruit: usize) -> f64 {
        let score_term = (score.saturating_mul(2).max(1) as f64).powi(2);
        let frame_term = if frames_since_fruit >= self.starvation_window {
            frames_alive.saturating_sub(frames_since_fruit).max(1)
        } else {
            frames_alive.max(1)
        };
        score_term * (frame_term as f64).powf(1.5)
    }
}

impl FitnessFunction for FoodSeekingFitness {
    fn fitness(&self, stats: &SessionStats) -> f64 {
        self.compute(stats.score, stats.frames_alive, stats.frames_since_fruit)
    }
}

#[cfg(test)]
mod tests {
    use gensnake_engine::TerminalReason;
    use proptest::prelude::*;

    use super::*;
    use crate::session::SessionEnd;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() <= 1e-9 * b.abs().max(1.0), "{a} != {b}");
    }

    #[test]
    fn test_reference_values() {
        let f = FoodSeekingFitness::default();
        // (3*2)^2 * 120^1.5
        assert_close(f.compute(3, 120, 10), 36.0 * 120f64.powf(1.5));
        // Starved: only the 70 frames before the last fruit count.
        assert_close(f.compute(3, 120, 50), 36.0 * 70f64.powf(1.5));
        // Score 0 is floored to a score term of 1.
        assert_close(f.compute(0, 9, 9), 27.0);
    }

    #[test]
    fn test_floors_keep_fitness_positive() {
        let f = FoodSeekingFitness::default();
        assert_eq!(f.compute(0, 0, 0), 1.0);
        assert_eq!(f.compute(0, 60, 60), 1.0);
        assert_eq!(f.compute(0, 1, 0), 1.0);
    }

    #[test]
    fn test_record_copies_stats() {
        let stats = SessionStats {
            score: 2,
            length: 3,
            frames_alive: 16,
            frames_since_fruit: 4,
            end: SessionEnd::GameOver(TerminalReason::WallCollision),
        };
        let record = FoodSeekingFitness::default().record(&stats);
        assert_eq!(record.score, 2);
        assert_eq!(record.frames_alive, 16);
        assert_close(record.fitness, 16.0 * 64.0);
    }

    proptest! {
        #[test]
        fn prop_fitness_positive_and_finite(
            score in 0usize..500,
            frames_alive in 0usize..100_000,
            idle in 0usize..1_000,
            window in 0usize..300,
        ) {
            let value = FoodSeekingFitness::new(window).compute(score, frames_alive, idle.min(frames_alive));
            prop_assert!(value.is_finite());
            prop_assert!(value >= 1.0);
        }

        #[test]
        fn prop_more_food_is_better(score in 0usize..100, frames in 1usize..10_000) {
            let f = FoodSeekingFitness::default();
            prop_assert!(f.compute(score + 1, frames, 0) > f.compute(score, frames, 0));
        }
    }
}

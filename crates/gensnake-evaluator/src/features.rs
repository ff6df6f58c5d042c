//! Network inputs extracted from a game state.
//!
//! | index | feature                                                     |
//! |-------|-------------------------------------------------------------|
//! | 0..4  | Manhattan distance from the cell one step away to the fruit |
//! | 4..8  | Open cells reachable from that same cell, divided by 20     |
//! | 8     | Snake length                                                |
//!
//! Both directional groups are ordered Left, Up, Right, Down, matching
//! [`Direction::ALL`] and the network outputs.

use gensnake_engine::{Direction, GameState};

pub const FEATURE_COUNT: usize = 9;

/// Divisor applied to open-space counts.
pub const OPEN_SPACE_SCALE: f64 = 20.0;

#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn extract(game: &GameState) -> [f64; FEATURE_COUNT] {
    let head = game.head();
    let mut features = [0.0; FEATURE_COUNT];
    for (i, direction) in Direction::ALL.into_iter().enumerate() {
        let candidate = head.moved(direction);
        features[i] = game
            .fruit()
            .map_or(0.0, |fruit| f64::from(candidate.manhattan_distance(fruit)));
        features[4 + i] = game.open_space_count(candidate) as f64 / OPEN_SPACE_SCALE;
    }
    features[8] = game.len() as f64;
    features
}

#[cfg(test)]
mod tests {
    use gensnake_engine::{Cell, FruitSeed, GameConfig};

    use super::*;

    #[test]
    fn test_single_segment_in_corner() {
        let game = GameState::with_layout(
            GameConfig::new(5, 5),
            vec![Cell::new(0, 0)],
            vec![],
            Cell::new(2, 3),
            FruitSeed::from_u64(0),
        )
        .unwrap();
        let f = extract(&game);
        // Left (0,-1), Up (-1,0), Right (0,1), Down (1,0)
        assert_eq!(&f[0..4], &[6.0, 6.0, 4.0, 4.0]);
        // Off-board neighbours have no open space; on-board ones reach
        // every free cell except themselves: 25 - 1 body - 1 start.
        assert_eq!(&f[4..8], &[0.0, 0.0, 23.0 / 20.0, 23.0 / 20.0]);
        assert_eq!(f[8], 1.0);
    }

    #[test]
    fn test_length_feature_counts_segments() {
        let game = GameState::with_layout(
            GameConfig::new(5, 5),
            vec![Cell::new(2, 2), Cell::new(2, 1), Cell::new(2, 0)],
            vec![Direction::Right; 3],
            Cell::new(0, 0),
            FruitSeed::from_u64(0),
        )
        .unwrap();
        let f = extract(&game);
        assert_eq!(f[8], 3.0);
        // Moving left lands on the body.
        assert_eq!(f[4], 0.0);
    }
}

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// A board coordinate.
///
/// Rows grow downward and columns grow to the right, so `(0, 0)` is the
/// top-left corner. Coordinates are signed because a head that has just left
/// the board is still representable until the wall check ends the game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("({row}, {col})")]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Returns the cell one step away in `direction`.
    #[must_use]
    pub const fn moved(self, direction: Direction) -> Self {
        let (dr, dc) = direction.delta();
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }

    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// The four orthogonal neighbours, in [`Direction::ALL`] order.
    #[must_use]
    pub fn neighbors(self) -> ArrayVec<Self, 4> {
        Direction::ALL.iter().map(|&d| self.moved(d)).collect()
    }
}

/// Movement direction of a snake segment.
///
/// The discriminant order `Left, Up, Right, Down` is shared with the network
/// inputs and outputs, so [`Direction::index`] and [`Direction::from_index`]
/// are the mapping between actions and directions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Left, Self::Up, Self::Right, Self::Down];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Left),
            1 => Some(Self::Up),
            2 => Some(Self::Right),
            3 => Some(Self::Down),
            _ => None,
        }
    }

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
        }
    }

    /// `(row, col)` offset of one step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Left => (0, -1),
            Self::Up => (-1, 0),
            Self::Right => (0, 1),
            Self::Down => (1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moved_follows_row_col_convention() {
        let c = Cell::new(3, 3);
        assert_eq!(c.moved(Direction::Left), Cell::new(3, 2));
        assert_eq!(c.moved(Direction::Up), Cell::new(2, 3));
        assert_eq!(c.moved(Direction::Right), Cell::new(3, 4));
        assert_eq!(c.moved(Direction::Down), Cell::new(4, 3));
    }

    #[test]
    fn test_manhattan_distance() {
        assert_eq!(Cell::new(0, 0).manhattan_distance(Cell::new(2, 3)), 5);
        assert_eq!(Cell::new(-1, 4).manhattan_distance(Cell::new(1, 1)), 5);
        assert!(Cell::new(1, 1).is_adjacent(Cell::new(1, 2)));
        assert!(!Cell::new(1, 1).is_adjacent(Cell::new(2, 2)));
    }

    #[test]
    fn test_neighbors_order() {
        let n = Cell::new(0, 0).neighbors();
        assert_eq!(
            n.as_slice(),
            &[
                Cell::new(0, -1),
                Cell::new(-1, 0),
                Cell::new(0, 1),
                Cell::new(1, 0)
            ]
        );
    }

    #[test]
    fn test_direction_index_round_trip() {
        for (i, d) in Direction::ALL.into_iter().enumerate() {
            assert_eq!(d.index(), i);
            assert_eq!(Direction::from_index(i), Some(d));
        }
        assert_eq!(Direction::from_index(4), None);
    }

    #[test]
    fn test_direction_parse_and_display() {
        assert_eq!("left".parse::<Direction>().unwrap(), Direction::Left);
        assert_eq!("Down".parse::<Direction>().unwrap(), Direction::Down);
        assert_eq!(Direction::Up.to_string(), "Up");
        assert_eq!(Direction::Up.opposite(), Direction::Down);
    }
}

use std::fmt;

use crate::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellKind {
    #[default]
    Empty,
    Fruit,
    Body,
    Head,
}

impl CellKind {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == CellKind::Empty
    }

    #[must_use]
    pub fn is_snake(self) -> bool {
        matches!(self, CellKind::Body | CellKind::Head)
    }
}

/// One board cell as seen by an external renderer.
///
/// `direction` is the last movement of the segment occupying the cell, and is
/// `None` for empty cells, the fruit and segments that have not moved yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapshotCell {
    pub kind: CellKind,
    pub direction: Option<Direction>,
}

/// Read-only row-major copy of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    rows: usize,
    cols: usize,
    cells: Vec<SnapshotCell>,
}

impl BoardSnapshot {
    pub(crate) fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![SnapshotCell::default(); rows * cols],
        }
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, cell: SnapshotCell) {
        self.cells[row * self.cols + col] = cell;
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<SnapshotCell> {
        (row < self.rows && col < self.cols).then(|| self.cells[row * self.cols + col])
    }

    pub fn rows_iter(&self) -> impl Iterator<Item = &[SnapshotCell]> + '_ {
        self.cells.chunks(self.cols.max(1))
    }

    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|c| c.kind == kind).count()
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows_iter() {
            for cell in row {
                let glyph = match (cell.kind, cell.direction) {
                    (CellKind::Empty, _) => " . ",
                    (CellKind::Fruit, _) => " F ",
                    (CellKind::Head, _) => " @ ",
                    (CellKind::Body, Some(Direction::Left | Direction::Right)) => "---",
                    (CellKind::Body, Some(Direction::Up | Direction::Down)) => " | ",
                    (CellKind::Body, None) => " O ",
                };
                f.write_str(glyph)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_draws_each_cell_kind() {
        let mut snap = BoardSnapshot::empty(2, 3);
        snap.set(
            0,
            0,
            SnapshotCell {
                kind: CellKind::Head,
                direction: Some(Direction::Left),
            },
        );
        snap.set(
            0,
            1,
            SnapshotCell {
                kind: CellKind::Body,
                direction: Some(Direction::Left),
            },
        );
        snap.set(
            1,
            2,
            SnapshotCell {
                kind: CellKind::Fruit,
                direction: None,
            },
        );
        assert_eq!(snap.to_string(), " @ --- . \n .  .  F \n");
        assert_eq!(snap.count(CellKind::Empty), 3);
    }

    #[test]
    fn test_get_out_of_range() {
        let snap = BoardSnapshot::empty(2, 2);
        assert!(snap.get(1, 1).is_some());
        assert!(snap.get(2, 0).is_none());
        assert!(snap.get(0, 2).is_none());
    }
}

use serde::{Deserialize, Serialize};

const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A `(row, col)` cell address on a square grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn is_within(&self, size: usize) -> bool {
        self.row < size && self.col < size
    }

    /// Moore neighbourhood of this position, clipped to a `size`x`size` grid.
    pub fn neighbors(self, size: usize) -> impl Iterator<Item = Position> {
        DISPLACEMENTS.iter().filter_map(move |&(dr, dc)| {
            let row = self.row.checked_add_signed(dr)?;
            let col = self.col.checked_add_signed(dc)?;
            let pos = Position::new(row, col);
            pos.is_within(size).then_some(pos)
        })
    }

    pub(crate) fn to_nd_index(self) -> [usize; 2] {
        [self.row, self.col]
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

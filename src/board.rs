use crate::{DifficultyConfig, GameError, Position};
use itertools::{iproduct, Itertools};
use ndarray::Array2;
use rand::Rng;
use std::ops::Index;

/// State of a single grid position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub(crate) hazard: bool,
    pub(crate) proximity: u8,
    pub(crate) revealed: bool,
    pub(crate) flagged: bool,
}

impl Cell {
    pub fn is_hazard(&self) -> bool {
        self.hazard
    }

    /// Hazards in the Moore neighbourhood. Not maintained for hazard cells.
    pub fn proximity(&self) -> u8 {
        self.proximity
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    cells: Array2<Cell>,
    size: usize,
    hazards: usize,
}

impl Board {
    /// Places `hazards` distinct hazards by rejection sampling and fills in proximity counts.
    pub fn generate<R: Rng + ?Sized>(
        size: usize,
        hazards: usize,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let mut board = Board::empty(size, hazards)?;

        let mut placed = 0;
        let mut draws = 0usize;
        while placed < hazards {
            let pos = Position::new(rng.gen_range(0..size), rng.gen_range(0..size));
            draws += 1;
            if board.place_hazard(pos) {
                placed += 1;
            }
        }

        log::debug!("Generated {size}x{size} board with {hazards} hazards in {draws} draws");
        Ok(board)
    }

    /// Builds a board with hazards at fixed positions. Duplicate positions count once.
    pub fn from_hazards(size: usize, hazards: &[Position]) -> Result<Self, GameError> {
        if let Some(&pos) = hazards.iter().find(|pos| !pos.is_within(size)) {
            return Err(GameError::HazardOutOfBounds(pos));
        }
        let distinct: Vec<Position> = hazards.iter().copied().unique().collect();

        let mut board = Board::empty(size, distinct.len())?;
        for pos in distinct {
            board.place_hazard(pos);
        }
        Ok(board)
    }

    fn empty(size: usize, hazards: usize) -> Result<Self, GameError> {
        DifficultyConfig {
            size,
            hazards,
            premium: false,
        }
        .validate()?;

        Ok(Board {
            cells: Array2::default((size, size)),
            size,
            hazards,
        })
    }

    /// Returns `false` when `pos` already holds a hazard.
    fn place_hazard(&mut self, pos: Position) -> bool {
        if self.cells[pos.to_nd_index()].hazard {
            return false;
        }
        self.cells[pos.to_nd_index()].hazard = true;
        for neighbor in pos.neighbors(self.size) {
            let cell = &mut self.cells[neighbor.to_nd_index()];
            if !cell.hazard {
                cell.proximity += 1;
            }
        }
        true
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn hazard_count(&self) -> usize {
        self.hazards
    }

    pub fn total_cells(&self) -> usize {
        self.size * self.size
    }

    pub fn safe_cell_count(&self) -> usize {
        self.total_cells() - self.hazards
    }

    pub fn get(&self, pos: Position) -> Option<&Cell> {
        self.cells.get(pos.to_nd_index())
    }

    pub(crate) fn get_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.cells.get_mut(pos.to_nd_index())
    }

    /// Row-major iteration over every position on the board.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        iproduct!(0..self.size, 0..self.size).map(Position::from)
    }

    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.positions().map(move |pos| (pos, &self[pos]))
    }

    pub fn hazard_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells()
            .filter(|(_, cell)| cell.hazard)
            .map(|(pos, _)| pos)
    }

    pub fn revealed_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.revealed).count()
    }

    pub fn flagged_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.flagged).count()
    }

    /// Reveals every hazard not under a flag. Used when a game is lost.
    pub(crate) fn reveal_unflagged_hazards(&mut self) {
        for cell in self.cells.iter_mut().filter(|cell| cell.hazard && !cell.flagged) {
            cell.revealed = true;
        }
    }

    /// True once every non-hazard cell is revealed. Hazard and flag state are irrelevant.
    pub fn is_cleared(&self) -> bool {
        self.cells.iter().all(|cell| cell.hazard || cell.revealed)
    }
}

impl Index<Position> for Board {
    type Output = Cell;

    fn index(&self, pos: Position) -> &Self::Output {
        &self.cells[pos.to_nd_index()]
    }
}

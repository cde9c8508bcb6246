//! The board model: cells, move application, and win/draw detection.
//!
//! Both board sizes use three-in-a-row. On the 4×4 board a line is any
//! run of three consecutive cells along a row, a column, or either
//! diagonal direction, which gives 24 candidate lines.

use serde::{Deserialize, Serialize};
use wagerboard_protocol::Symbol;

use crate::BoardError;

type Line = [usize; 3];

const LINES_3X3: [Line; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

const LINES_4X4: [Line; 24] = [
    // rows
    [0, 1, 2],
    [1, 2, 3],
    [4, 5, 6],
    [5, 6, 7],
    [8, 9, 10],
    [9, 10, 11],
    [12, 13, 14],
    [13, 14, 15],
    // columns
    [0, 4, 8],
    [4, 8, 12],
    [1, 5, 9],
    [5, 9, 13],
    [2, 6, 10],
    [6, 10, 14],
    [3, 7, 11],
    [7, 11, 15],
    // down-right
    [0, 5, 10],
    [1, 6, 11],
    [4, 9, 14],
    [5, 10, 15],
    // down-left
    [3, 6, 9],
    [2, 5, 8],
    [7, 10, 13],
    [6, 9, 12],
];

/// Which board a room plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardSize {
    /// 3×3, 9 cells.
    Three,
    /// 4×4, 16 cells.
    Four,
}

impl BoardSize {
    /// Number of cells.
    pub fn cells(self) -> usize {
        match self {
            Self::Three => 9,
            Self::Four => 16,
        }
    }

    /// Every winning line, in the fixed scan order.
    pub fn lines(self) -> &'static [Line] {
        match self {
            Self::Three => &LINES_3X3,
            Self::Four => &LINES_4X4,
        }
    }
}

/// Result of [`Board::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ongoing,
    Win(Symbol),
    Draw,
}

/// A game board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: BoardSize,
    cells: Vec<Option<Symbol>>,
}

impl Board {
    /// An empty board.
    pub fn new(size: BoardSize) -> Self {
        Self {
            size,
            cells: vec![None; size.cells()],
        }
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell at `index`, or `None` past the end.
    pub fn cell(&self, index: usize) -> Option<Option<Symbol>> {
        self.cells.get(index).copied()
    }

    /// A snapshot of every cell, for the wire.
    pub fn cells(&self) -> Vec<Option<Symbol>> {
        self.cells.clone()
    }

    /// Place `symbol` on an empty cell.
    pub fn apply_move(&mut self, index: usize, symbol: Symbol) -> Result<(), BoardError> {
        let len = self.cells.len();
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(BoardError::OutOfRange { index, len })?;
        if cell.is_some() {
            return Err(BoardError::IllegalMove { index });
        }
        *cell = Some(symbol);
        Ok(())
    }

    /// `true` when no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Scan every line; a line wins when all three cells hold the same
    /// symbol. A mismatched line never ends the scan early.
    pub fn evaluate(&self) -> Outcome {
        for &[a, b, c] in self.size.lines() {
            if let Some(symbol) = self.cells[a] {
                if self.cells[b] == Some(symbol) && self.cells[c] == Some(symbol) {
                    return Outcome::Win(symbol);
                }
            }
        }
        if self.is_full() {
            Outcome::Draw
        } else {
            Outcome::Ongoing
        }
    }

    /// Clear every cell, for a fresh game or the replay after a draw.
    pub fn reset(&mut self) {
        self.cells.fill(None);
    }
}

//! Move application and terminal-state evaluation.

use super::types::{Board, Cell, Mark};
use crate::error::GameError;
use serde::{Deserialize, Serialize};

/// Winning lines: 3 rows, 3 columns, 2 diagonals.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // Rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // Columns
    [0, 4, 8],
    [2, 4, 6], // Diagonals
];

/// Terminal-state evaluation result for a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// No line is complete and empty cells remain.
    Ongoing,
    /// A line holds three of the same mark.
    Win {
        /// The winning mark.
        mark: Mark,
        /// Cell indices of the completed line.
        line: [usize; 3],
    },
    /// No line is complete and no empty cell remains.
    Draw,
}

impl Board {
    /// Places a mark at the given position.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidMove`] if the position is outside 0..9 or
    /// the cell is already taken. The board is unchanged on error.
    pub fn apply(&mut self, pos: usize, mark: Mark) -> Result<(), GameError> {
        if pos >= 9 || !self.is_empty(pos) {
            return Err(GameError::InvalidMove);
        }
        self.set(pos, Cell::Taken(mark));
        Ok(())
    }

    /// Evaluates the board for a terminal state.
    ///
    /// Checks the 8 fixed lines; a line wins when all three cells hold the
    /// same mark. Draw when no line wins and the board is full. Pure and
    /// deterministic.
    pub fn evaluate(&self) -> Outcome {
        for line in LINES {
            let [a, b, c] = line;
            if let Some(Cell::Taken(mark)) = self.get(a)
                && self.get(b) == Some(Cell::Taken(mark))
                && self.get(c) == Some(Cell::Taken(mark))
            {
                return Outcome::Win { mark, line };
            }
        }

        if self.is_full() {
            Outcome::Draw
        } else {
            Outcome::Ongoing
        }
    }
}

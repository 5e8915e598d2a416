// SPDX-License-Identifier: MIT OR Apache-2.0

//! Board representation, gravity placement, and win/draw detection

use crate::{Cell, Player, Symbols};

/// A Connect 4 board
///
/// Rows are stored top-to-bottom, so row `0` is the row chips fall past
/// last. Columns are 1-based at the public API to match the column numbers
/// players type in chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// Row-major cells, `cells[row * width + column]`
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new board with every position empty
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    /// Board width in columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Board height in rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// The cell at the given 0-based row (top row is 0) and 0-based column
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.cells[row * self.width + col])
    }

    fn at(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.width + col]
    }

    /// Check whether a move in the given 1-based column is valid
    ///
    /// A column is playable iff it exists and its topmost cell is empty.
    pub fn is_valid_move(&self, column: usize) -> bool {
        (1..=self.width).contains(&column) && self.at(0, column - 1) == Cell::Empty
    }

    /// Drop a chip into the given 1-based column
    ///
    /// The chip lands in the lowest empty row of the column. Callers are
    /// expected to have checked [`Board::is_valid_move`] first; returns
    /// whether a chip actually landed.
    pub fn place(&mut self, column: usize, cell: Cell) -> bool {
        if !(1..=self.width).contains(&column) {
            return false;
        }
        let col = column - 1;
        for row in (0..self.height).rev() {
            if self.at(row, col) == Cell::Empty {
                self.cells[row * self.width + col] = cell;
                return true;
            }
        }
        false
    }

    /// Number of chips currently stacked in the given 1-based column
    pub fn column_fill(&self, column: usize) -> usize {
        let col = column - 1;
        (0..self.height)
            .filter(|&row| self.at(row, col) != Cell::Empty)
            .count()
    }

    /// Scan the board for a four-in-a-row run
    ///
    /// Cells are scanned top-to-bottom, left-to-right; from each occupied
    /// cell the four directions are checked in a fixed precedence:
    /// horizontal (rightward), vertical (downward), ascending diagonal
    /// (up-right), descending diagonal (down-right). The first run found
    /// decides the result.
    pub fn winner(&self) -> Option<Player> {
        for i in 0..self.height {
            for j in 0..self.width {
                let cell = self.at(i, j);
                if cell == Cell::Empty {
                    continue;
                }

                // Horizontal, e.g. -
                if j + 4 <= self.width && (1..4).all(|n| self.at(i, j + n) == cell) {
                    return cell.player();
                }

                // Vertical, e.g. |
                if i + 4 <= self.height && (1..4).all(|n| self.at(i + n, j) == cell) {
                    return cell.player();
                }

                // Ascending diagonal from its bottom-left cell, e.g. /
                if i >= 3 && j + 4 <= self.width && (1..4).all(|n| self.at(i - n, j + n) == cell) {
                    return cell.player();
                }

                // Descending diagonal from its top-left cell, e.g. \
                if i + 4 <= self.height
                    && j + 4 <= self.width
                    && (1..4).all(|n| self.at(i + n, j + n) == cell)
                {
                    return cell.player();
                }
            }
        }

        None
    }

    /// Check the inherited draw condition
    ///
    /// The game is declared a draw only when the top row is completely
    /// filled with one single repeated chip; a full top row of mixed chips
    /// does not count.
    pub fn is_top_full(&self) -> bool {
        let first = self.at(0, 0);
        if first == Cell::Empty {
            return false;
        }
        (1..self.width).all(|col| self.at(0, col) == first)
    }

    /// Render the board as one string per row, top row first
    ///
    /// The iterator is lazy and can be re-created by calling `render`
    /// again; the board is not consumed.
    pub fn render<'a>(&'a self, symbols: &'a Symbols) -> impl Iterator<Item = String> + 'a {
        self.cells.chunks(self.width).map(move |row| {
            row.iter()
                .map(|&cell| symbols.for_cell(cell))
                .collect::<String>()
        })
    }
}

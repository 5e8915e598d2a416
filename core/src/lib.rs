// SPDX-License-Identifier: MIT OR Apache-2.0

//! chatfour core - Connect 4 board logic
//!
//! This crate provides the game-rules half of chatfour:
//! - Board representation with gravity placement
//! - Win and draw detection
//! - Per-row board rendering for chat output

#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod board;

use serde::{Deserialize, Serialize};

/// Occupancy state of a single board position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// No chip has landed here yet
    Empty,
    /// A chip played by player one
    PlayerOne,
    /// A chip played by player two
    PlayerTwo,
}

impl Cell {
    /// The player whose chip occupies this cell, if any
    pub fn player(&self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::PlayerOne => Some(Player::One),
            Cell::PlayerTwo => Some(Player::Two),
        }
    }
}

/// One of the two sides in a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// Player one (the challenger by default)
    One,
    /// Player two
    Two,
}

impl Player {
    /// Returns the opposing player
    pub fn opposite(&self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// The chip this player drops into the board
    pub fn cell(&self) -> Cell {
        match self {
            Player::One => Cell::PlayerOne,
            Player::Two => Cell::PlayerTwo,
        }
    }
}

/// Chip symbols used when rendering a board into chat messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbols {
    /// Symbol for an empty position
    pub empty: String,
    /// Symbol for player one's chips
    pub p1: String,
    /// Symbol for player two's chips
    pub p2: String,
}

impl Symbols {
    /// The symbol for a cell state
    pub fn for_cell(&self, cell: Cell) -> &str {
        match cell {
            Cell::Empty => &self.empty,
            Cell::PlayerOne => &self.p1,
            Cell::PlayerTwo => &self.p2,
        }
    }
}

impl Default for Symbols {
    fn default() -> Self {
        Self {
            empty: "⚫".to_string(),
            p1: "🟠".to_string(),
            p2: "🔵".to_string(),
        }
    }
}

pub use board::Board;

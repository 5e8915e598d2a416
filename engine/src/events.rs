// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound notifications
//!
//! Everything the engine wants said in chat leaves as a [`Notification`]
//! on the registry's broadcast channel. Events carry parameters, not
//! formatted text; the transport owns wording and localisation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An event addressed to one channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// The channel this event belongs to
    pub channel: String,
    /// What happened
    pub event: ChatEvent,
}

/// Events emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatEvent {
    /// A challenge was created
    ChallengeIssued {
        /// The challenging user
        from: String,
        /// The challenged user, or `None` for an open challenge
        to: Option<String>,
    },
    /// A pending challenge ran out of time
    ChallengeExpired {
        /// The challenging user
        from: String,
    },
    /// The challenger withdrew their own challenge
    ChallengeCancelled {
        /// The challenging user
        from: String,
    },
    /// The challenged user declined
    ChallengeDeclined {
        /// The challenging user
        from: String,
        /// The user who declined
        to: String,
    },
    /// A game began
    GameStarted {
        /// Player one
        player_one: String,
        /// Player two
        player_two: String,
    },
    /// A new turn began
    TurnStarted {
        /// The player expected to move
        player: String,
    },
    /// A rendering of the board, one string per row, top row first
    Board {
        /// Rendered rows
        rows: Vec<String>,
    },
    /// A game ended with a winner
    GameWon {
        /// The winning player
        winner: String,
    },
    /// A game ended in a draw
    GameTied {
        /// Player one
        player_one: String,
        /// Player two
        player_two: String,
    },
    /// A player gave up, or ran out of time on their turn
    Forfeited {
        /// The forfeiting player
        player: String,
    },
    /// Games were enabled or disabled in a channel
    GamesToggled {
        /// The new state
        enabled: bool,
    },
    /// A pending challenge was dropped at shutdown
    ChallengeAborted {
        /// The challenging user
        from: String,
    },
    /// A running game was dropped at shutdown
    GameAborted {
        /// Player one
        player_one: String,
        /// Player two
        player_two: String,
    },
    /// A command could not be carried out
    Rejected {
        /// The user whose command was rejected
        user: String,
        /// Why
        reason: RejectReason,
    },
}

/// Why a user command was rejected
///
/// All of these are recoverable, user-facing conditions; none are fatal
/// to the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The user is already playing in this channel
    #[error("already in a game")]
    AlreadyInGame,
    /// The user already has an outgoing challenge in this channel
    #[error("already has an outgoing challenge")]
    AlreadyChallenging,
    /// The challenged user is already playing
    #[error("{target} is already in a game")]
    TargetInGame {
        /// The user who could not be challenged
        target: String,
    },
    /// Concurrent games are disabled and one is already running
    #[error("a game or challenge is already ongoing")]
    AlreadyOngoing,
    /// The challenge exists but is addressed to someone else
    #[error("challenge was meant for another user")]
    Generic,
    /// The user is not in any game in this channel
    #[error("not in a game")]
    NotInGame,
    /// It is the other player's turn
    #[error("not this player's turn")]
    NotYourTurn,
    /// A move command arrived without a column
    #[error("no column specified")]
    NoColumnSpecified,
    /// The column was non-numeric, out of range, or full
    #[error("invalid column")]
    InvalidColumn,
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! chatfour engine - challenge and game lifecycle
//!
//! This crate runs the games themselves:
//! - Challenge handshakes with expiration timers
//! - Active games with per-turn timers and win/tie/forfeit resolution
//! - A per-channel registry that external command dispatchers call into
//!
//! The engine knows nothing about any particular chat service. Inbound
//! intents arrive as [`registry::ChannelRegistry`] method calls and
//! outbound traffic leaves as [`events::Notification`] values on a
//! broadcast channel the transport subscribes to.

#![deny(unsafe_code)]

pub mod challenge;
pub mod config;
pub mod events;
pub mod game;
pub mod registry;
pub mod scheduler;

use thiserror::Error;

/// A state transition was attempted on an already-settled entity
///
/// The registry always checks liveness before delegating, so this error
/// stays internal to the engine.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{0} has already been settled")]
pub struct InvalidStateError(pub &'static str);

/// Chat user names compare case-insensitively everywhere in the engine
pub(crate) fn same_user(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

pub use challenge::{Challenge, ChallengeId, ChallengeState};
pub use config::Config;
pub use events::{ChatEvent, Notification, RejectReason};
pub use game::{Game, GameId, TurnOutcome};
pub use registry::ChannelRegistry;
pub use scheduler::{Scheduler, TimerHandle};

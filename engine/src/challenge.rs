// SPDX-License-Identifier: MIT OR Apache-2.0

//! Challenge handshake state machine

use std::time::Instant;
use uuid::Uuid;

use crate::scheduler::TimerHandle;
use crate::{same_user, InvalidStateError};

/// Unique identifier for a challenge
pub type ChallengeId = Uuid;

/// Lifecycle state of a challenge
///
/// `Pending` is the only live state; the three others are terminal and
/// absorb all further transition attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeState {
    /// Waiting to be accepted
    Pending,
    /// Converted into a game
    Accepted,
    /// The expiration timer fired
    Expired,
    /// Withdrawn, declined, or dropped at shutdown
    Cancelled,
}

/// A pending, time-boxed invitation to play
#[derive(Debug)]
pub struct Challenge {
    id: ChallengeId,
    channel: String,
    from: String,
    to: Option<String>,
    created_at: Instant,
    state: ChallengeState,
    expiry: Option<TimerHandle>,
}

impl Challenge {
    /// Create a new pending challenge
    ///
    /// `to = None` leaves the challenge open for any user to accept. The
    /// expiration timer is armed separately by the registry.
    pub fn new(channel: impl Into<String>, from: impl Into<String>, to: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.into(),
            from: from.into(),
            to,
            created_at: Instant::now(),
            state: ChallengeState::Pending,
            expiry: None,
        }
    }

    /// Unique id of this challenge
    pub fn id(&self) -> ChallengeId {
        self.id
    }

    /// The channel this challenge was sent in
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The user who sent this challenge
    pub fn from(&self) -> &str {
        &self.from
    }

    /// The challenged user, or `None` for an open challenge
    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    /// Current lifecycle state
    pub fn state(&self) -> ChallengeState {
        self.state
    }

    /// Whether the challenge can still be accepted
    pub fn is_pending(&self) -> bool {
        self.state == ChallengeState::Pending
    }

    /// How long ago the challenge was created
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }

    /// Whether the user sent or received this challenge
    pub fn involves(&self, user: &str) -> bool {
        self.is_from(user) || self.to().is_some_and(|to| same_user(to, user))
    }

    /// Whether the user sent this challenge
    pub fn is_from(&self, user: &str) -> bool {
        same_user(&self.from, user)
    }

    /// Whether the given user may accept this challenge
    ///
    /// Open challenges are acceptable by anyone; targeted challenges only
    /// by the addressed user.
    pub fn is_acceptable_by(&self, user: &str) -> bool {
        match self.to() {
            None => true,
            Some(to) => same_user(to, user),
        }
    }

    /// Hand the expiration timer to this challenge
    ///
    /// Any previously armed timer is disarmed first; a challenge owns at
    /// most one outstanding timer.
    pub fn arm(&mut self, handle: TimerHandle) {
        self.disarm();
        self.expiry = Some(handle);
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.expiry.take() {
            handle.cancel();
        }
    }

    /// Accept this challenge on behalf of `user`
    ///
    /// Binds the challenge to the accepting user (their spelling wins,
    /// also for a challenge that was already addressed to them), disarms
    /// the timer, and settles the challenge. Fails on a non-pending
    /// challenge.
    pub fn accept(&mut self, user: &str) -> Result<(), InvalidStateError> {
        if !self.is_pending() {
            return Err(InvalidStateError("challenge"));
        }
        self.to = Some(user.to_string());
        self.disarm();
        self.state = ChallengeState::Accepted;
        Ok(())
    }

    /// Mark this challenge expired
    ///
    /// Called from the timer path; fails if the challenge was settled in
    /// the meantime.
    pub fn expire(&mut self) -> Result<(), InvalidStateError> {
        if !self.is_pending() {
            return Err(InvalidStateError("challenge"));
        }
        self.disarm();
        self.state = ChallengeState::Expired;
        Ok(())
    }

    /// Cancel this challenge
    ///
    /// Idempotent: cancelling an already-settled challenge changes
    /// nothing.
    pub fn cancel(&mut self) {
        if self.is_pending() {
            self.state = ChallengeState::Cancelled;
        }
        self.disarm();
    }
}

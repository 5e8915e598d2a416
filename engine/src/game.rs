// SPDX-License-Identifier: MIT OR Apache-2.0

//! Active game state machine

use chatfour_core::{Board, Player};
use uuid::Uuid;

use crate::scheduler::TimerHandle;
use crate::same_user;

/// Unique identifier for a game
pub type GameId = Uuid;

/// What a completed half-move led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The move completed a four-in-a-row run
    Won(Player),
    /// The move filled the top row with a single repeated chip
    Tied,
    /// Play continues; the contained player is now active
    NextTurn(Player),
}

/// An active match between two bound players
///
/// Games are only ever created from an accepted challenge. The active
/// player alternates strictly after each completed turn, and a game holds
/// at most one live turn timer at a time; the turn sequence number lets a
/// stale timer firing be told apart from the current one.
#[derive(Debug)]
pub struct Game {
    id: GameId,
    channel: String,
    player_one: String,
    player_two: String,
    board: Board,
    active: Player,
    turn_seq: u64,
    turn_timer: Option<TimerHandle>,
}

impl Game {
    /// Create a new game
    ///
    /// `random_start` flips a coin for who moves first; otherwise player
    /// one (the challenger) starts.
    pub fn new(
        channel: impl Into<String>,
        player_one: impl Into<String>,
        player_two: impl Into<String>,
        width: usize,
        height: usize,
        random_start: bool,
    ) -> Self {
        let mut active = Player::One;
        if random_start && rand::random::<bool>() {
            active = Player::Two;
        }

        Self {
            id: Uuid::new_v4(),
            channel: channel.into(),
            player_one: player_one.into(),
            player_two: player_two.into(),
            board: Board::new(width, height),
            active,
            turn_seq: 0,
            turn_timer: None,
        }
    }

    /// Unique id of this game
    pub fn id(&self) -> GameId {
        self.id
    }

    /// The channel this game is played in
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The current board
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The player whose turn it is
    pub fn active(&self) -> Player {
        self.active
    }

    /// Monotonic counter identifying the current turn
    pub fn turn_seq(&self) -> u64 {
        self.turn_seq
    }

    /// Both player names, player one first
    pub fn players(&self) -> [&str; 2] {
        [&self.player_one, &self.player_two]
    }

    /// The stored name of the given side
    pub fn name_of(&self, player: Player) -> &str {
        match player {
            Player::One => &self.player_one,
            Player::Two => &self.player_two,
        }
    }

    /// The stored name of the player expected to move
    pub fn active_name(&self) -> &str {
        self.name_of(self.active)
    }

    /// Whether the user plays in this game
    pub fn has_player(&self, user: &str) -> bool {
        same_user(&self.player_one, user) || same_user(&self.player_two, user)
    }

    /// Whether it is this user's turn
    pub fn is_turn_of(&self, user: &str) -> bool {
        same_user(self.active_name(), user)
    }

    /// The stored spelling of `user`'s own name
    ///
    /// `user` must be one of the two players.
    pub fn canonical_name(&self, user: &str) -> &str {
        if same_user(&self.player_one, user) {
            &self.player_one
        } else {
            &self.player_two
        }
    }

    /// The stored name of the opponent of `user`
    ///
    /// `user` must be one of the two players; a forfeit by either side
    /// always awards the other.
    pub fn opponent_of(&self, user: &str) -> &str {
        if same_user(&self.player_one, user) {
            &self.player_two
        } else {
            &self.player_one
        }
    }

    /// Whether a chip can land in the given 1-based column
    pub fn is_valid_move(&self, column: usize) -> bool {
        self.board.is_valid_move(column)
    }

    /// Hand the turn timer to this game
    ///
    /// Any previous timer is disarmed first; a game owns at most one
    /// outstanding timer.
    pub fn arm(&mut self, handle: TimerHandle) {
        self.disarm();
        self.turn_timer = Some(handle);
    }

    /// Disarm the turn timer, if armed
    pub fn disarm(&mut self) {
        if let Some(handle) = self.turn_timer.take() {
            handle.cancel();
        }
    }

    /// Play the active player's chip into `column`
    ///
    /// Callers must have validated the column with
    /// [`Game::is_valid_move`]. Disarms the turn timer, drops the chip,
    /// and resolves the turn: win, tie, or a flip to the other player
    /// (which also advances the turn sequence).
    pub fn apply_move(&mut self, column: usize) -> TurnOutcome {
        self.disarm();
        self.board.place(column, self.active.cell());

        if let Some(winner) = self.board.winner() {
            return TurnOutcome::Won(winner);
        }
        if self.board.is_top_full() {
            return TurnOutcome::Tied;
        }

        self.active = self.active.opposite();
        self.turn_seq += 1;
        TurnOutcome::NextTurn(self.active)
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-channel challenge and game registry
//!
//! The single integration point external command dispatchers call into.
//! Each inbound intent and each timer firing takes the registry lock, so
//! all mutations of a channel's collections are serialized; timer
//! callbacks re-check entity liveness under that same lock before acting.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use crate::challenge::{Challenge, ChallengeId};
use crate::config::Config;
use crate::events::{ChatEvent, Notification, RejectReason};
use crate::game::{Game, GameId, TurnOutcome};
use crate::scheduler::Scheduler;

/// Buffer size for the outbound notification channel
const NOTIFICATION_BUFFER: usize = 100;

/// Per-channel collections, created lazily on first interaction
struct ChannelState {
    challenges: Vec<Challenge>,
    games: Vec<Game>,
    games_enabled: bool,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            challenges: Vec::new(),
            games: Vec::new(),
            games_enabled: true,
        }
    }
}

impl ChannelState {
    /// First challenge the user sent or received, in insertion order
    fn challenge_for(&self, user: &str) -> Option<usize> {
        self.challenges.iter().position(|c| c.involves(user))
    }

    /// First game the user plays in
    fn game_for(&self, user: &str) -> Option<usize> {
        self.games.iter().position(|g| g.has_player(user))
    }
}

struct RegistryShared {
    config: Config,
    scheduler: Scheduler,
    channels: Mutex<HashMap<String, ChannelState>>,
    /// Outbound notification broadcaster
    events_tx: broadcast::Sender<Notification>,
    /// Keep a receiver alive to prevent channel closure
    _events_rx: broadcast::Receiver<Notification>,
}

/// Registry of every channel's challenges and games
///
/// Cheap to clone; clones share state. Timer callbacks hold a clone, so
/// the registry stays alive while any timer is outstanding.
#[derive(Clone)]
pub struct ChannelRegistry {
    shared: Arc<RegistryShared>,
}

enum Conclusion {
    Won(String),
    Tied,
}

impl ChannelRegistry {
    /// Create a new registry
    pub fn new(config: Config, scheduler: Scheduler) -> Self {
        let (events_tx, events_rx) = broadcast::channel(NOTIFICATION_BUFFER);

        Self {
            shared: Arc::new(RegistryShared {
                config,
                scheduler,
                channels: Mutex::new(HashMap::new()),
                events_tx,
                _events_rx: events_rx,
            }),
        }
    }

    /// Get a receiver for outbound notifications
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.shared.events_tx.subscribe()
    }

    /// The configuration this registry was built with
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Lazily materialize a channel's collections
    pub async fn ensure_channel(&self, channel: &str) {
        let mut channels = self.shared.channels.lock().await;
        channels.entry(channel.to_string()).or_default();
    }

    /// Whether games are currently enabled in a channel
    pub async fn games_enabled(&self, channel: &str) -> bool {
        let mut channels = self.shared.channels.lock().await;
        channels.entry(channel.to_string()).or_default().games_enabled
    }

    /// Enable or disable new games in a channel
    pub async fn set_games_enabled(&self, channel: &str, enabled: bool) {
        let mut channels = self.shared.channels.lock().await;
        let _span = tracing::info_span!("engine.registry", "ChannelRegistry::set_games_enabled").entered();

        channels.entry(channel.to_string()).or_default().games_enabled = enabled;
        self.notify(channel, ChatEvent::GamesToggled { enabled });
    }

    /// First challenge in the channel the user sent or received
    pub async fn find_challenge_for(&self, channel: &str, user: &str) -> Option<ChallengeId> {
        let channels = self.shared.channels.lock().await;
        let state = channels.get(channel)?;
        state.challenge_for(user).map(|idx| state.challenges[idx].id())
    }

    /// First game in the channel the user plays in
    pub async fn find_game_for(&self, channel: &str, user: &str) -> Option<GameId> {
        let channels = self.shared.channels.lock().await;
        let state = channels.get(channel)?;
        state.game_for(user).map(|idx| state.games[idx].id())
    }

    /// Handle a `play` intent
    ///
    /// With no target: accepts the first open challenge in the channel,
    /// or creates a new open challenge. With a target: accepts that
    /// user's challenge if it is open or addressed to the caller, or
    /// sends them a new challenge.
    pub async fn request_play(&self, channel: &str, user: &str, target: Option<&str>) {
        let mut channels = self.shared.channels.lock().await;
        let _span = tracing::info_span!("engine.registry", "ChannelRegistry::request_play").entered();
        let state = channels.entry(channel.to_string()).or_default();

        if state.game_for(user).is_some() {
            self.reject(channel, user, RejectReason::AlreadyInGame);
            return;
        }
        if state.challenges.iter().any(|c| c.is_from(user)) {
            self.reject(channel, user, RejectReason::AlreadyChallenging);
            return;
        }

        match target {
            Some(target) => {
                let target = target.trim();

                if state.game_for(target).is_some() {
                    self.reject(
                        channel,
                        user,
                        RejectReason::TargetInGame {
                            target: target.to_string(),
                        },
                    );
                    return;
                }

                match state.challenge_for(target) {
                    None => self.create_challenge(state, channel, user, Some(target)),
                    Some(idx) if state.challenges[idx].is_acceptable_by(user) => {
                        self.accept_challenge(state, channel, idx, user);
                    }
                    Some(_) => self.reject(channel, user, RejectReason::Generic),
                }
            }
            None => {
                // Look for an open challenge to accept before opening a
                // new one.
                match state.challenges.iter().position(|c| c.to().is_none()) {
                    Some(idx) => self.accept_challenge(state, channel, idx, user),
                    None => self.create_challenge(state, channel, user, None),
                }
            }
        }
    }

    /// Handle a `put` intent
    ///
    /// `column` is the raw command argument: missing, non-numeric, and
    /// out-of-range input are all rejected without touching the board.
    pub async fn request_move(&self, channel: &str, user: &str, column: Option<&str>) {
        let mut channels = self.shared.channels.lock().await;
        let _span = tracing::info_span!("engine.registry", "ChannelRegistry::request_move").entered();
        let state = channels.entry(channel.to_string()).or_default();

        let Some(idx) = state.game_for(user) else {
            self.reject(channel, user, RejectReason::NotInGame);
            return;
        };

        if !state.games[idx].is_turn_of(user) {
            self.reject(channel, user, RejectReason::NotYourTurn);
            return;
        }

        let Some(raw) = column else {
            self.reject(channel, user, RejectReason::NoColumnSpecified);
            return;
        };
        let Ok(column) = raw.trim().parse::<usize>() else {
            self.reject(channel, user, RejectReason::InvalidColumn);
            return;
        };
        if !state.games[idx].is_valid_move(column) {
            self.reject(channel, user, RejectReason::InvalidColumn);
            return;
        }

        match state.games[idx].apply_move(column) {
            TurnOutcome::Won(player) => {
                let winner = state.games[idx].name_of(player).to_string();
                self.finish_game(state, channel, idx, Conclusion::Won(winner));
            }
            TurnOutcome::Tied => self.finish_game(state, channel, idx, Conclusion::Tied),
            TurnOutcome::NextTurn(_) => self.begin_turn(channel, &mut state.games[idx]),
        }
    }

    /// Handle a `forfeit` intent
    ///
    /// Forfeits the user's game, withdraws their outgoing challenge, or
    /// declines their incoming challenge, whichever is found first.
    pub async fn request_forfeit(&self, channel: &str, user: &str) {
        let mut channels = self.shared.channels.lock().await;
        let _span = tracing::info_span!("engine.registry", "ChannelRegistry::request_forfeit").entered();
        let state = channels.entry(channel.to_string()).or_default();

        if let Some(idx) = state.game_for(user) {
            let game = &state.games[idx];
            // Report the stored spelling, not whatever case was typed.
            let loser = game.canonical_name(user).to_string();
            let winner = game.opponent_of(user).to_string();

            self.notify(channel, ChatEvent::Forfeited { player: loser });
            self.finish_game(state, channel, idx, Conclusion::Won(winner));
        } else if let Some(idx) = state.challenge_for(user) {
            let mut challenge = state.challenges.remove(idx);
            challenge.cancel();

            if challenge.is_from(user) {
                self.notify(
                    channel,
                    ChatEvent::ChallengeCancelled {
                        from: challenge.from().to_string(),
                    },
                );
            } else {
                self.notify(
                    channel,
                    ChatEvent::ChallengeDeclined {
                        from: challenge.from().to_string(),
                        to: challenge.to().unwrap_or(user).to_string(),
                    },
                );
            }
        } else {
            self.reject(channel, user, RejectReason::NotInGame);
        }
    }

    /// Cancel every pending challenge and running game, notifying all
    /// affected users
    ///
    /// Called once at process termination. Leaves no pending timers and
    /// no entries in any channel's collections.
    pub async fn shutdown(&self) {
        let mut channels = self.shared.channels.lock().await;
        let _span = tracing::info_span!("engine.registry", "ChannelRegistry::shutdown").entered();

        for (channel, state) in channels.iter_mut() {
            for mut challenge in state.challenges.drain(..) {
                challenge.cancel();
                self.notify(
                    channel,
                    ChatEvent::ChallengeAborted {
                        from: challenge.from().to_string(),
                    },
                );
            }
            for mut game in state.games.drain(..) {
                game.disarm();
                let [player_one, player_two] = game.players();
                self.notify(
                    channel,
                    ChatEvent::GameAborted {
                        player_one: player_one.to_string(),
                        player_two: player_two.to_string(),
                    },
                );
            }
        }

        tracing::info!("Registry shut down, all challenges and games cancelled");
    }

    /// Timer path: a challenge's expiration timer fired
    async fn expire_challenge(self, channel: String, id: ChallengeId) {
        let mut channels = self.shared.channels.lock().await;
        let Some(state) = channels.get_mut(&channel) else {
            return;
        };
        // The challenge may have been settled while this task was racing
        // for the lock.
        let Some(idx) = state.challenges.iter().position(|c| c.id() == id) else {
            return;
        };

        let mut challenge = state.challenges.remove(idx);
        if challenge.expire().is_err() {
            tracing::warn!(channel = %channel, "Settled challenge was still registered");
            return;
        }

        tracing::debug!(
            channel = %channel,
            from = %challenge.from(),
            age = ?challenge.age(),
            "Challenge expired"
        );
        self.notify(
            &channel,
            ChatEvent::ChallengeExpired {
                from: challenge.from().to_string(),
            },
        );
    }

    /// Timer path: a game's turn timer fired
    ///
    /// The player whose turn it was forfeits. A stale firing (the turn
    /// advanced while this task was racing for the lock) is a no-op.
    async fn turn_timeout(self, channel: String, id: GameId, seq: u64) {
        let mut channels = self.shared.channels.lock().await;
        let Some(state) = channels.get_mut(&channel) else {
            return;
        };
        let Some(idx) = state.games.iter().position(|g| g.id() == id) else {
            return;
        };
        if state.games[idx].turn_seq() != seq {
            return;
        }

        let loser = state.games[idx].active_name().to_string();
        let winner = state.games[idx].opponent_of(&loser).to_string();

        tracing::debug!(channel = %channel, player = %loser, "Turn timer ran out");
        self.notify(&channel, ChatEvent::Forfeited { player: loser });
        self.finish_game(state, &channel, idx, Conclusion::Won(winner));
    }

    /// Create a new challenge, subject to the concurrency gate
    fn create_challenge(&self, state: &mut ChannelState, channel: &str, from: &str, to: Option<&str>) {
        if !self.shared.config.game.concurrent
            && (!state.challenges.is_empty() || !state.games.is_empty())
        {
            self.reject(channel, from, RejectReason::AlreadyOngoing);
            return;
        }

        let mut challenge = Challenge::new(channel, from, to.map(str::to_string));

        let registry = self.clone();
        let timer_channel = channel.to_string();
        let id = challenge.id();
        let handle = self.shared.scheduler.after(
            self.shared.config.game.timer_duration(),
            async move {
                registry.expire_challenge(timer_channel, id).await;
            },
        );
        challenge.arm(handle);

        tracing::debug!(channel = %channel, from = %from, to = ?to, "Challenge created");
        self.notify(
            channel,
            ChatEvent::ChallengeIssued {
                from: from.to_string(),
                to: to.map(str::to_string),
            },
        );
        state.challenges.push(challenge);
    }

    /// Accept the challenge at `idx` and start the resulting game
    fn accept_challenge(&self, state: &mut ChannelState, channel: &str, idx: usize, user: &str) {
        let mut challenge = state.challenges.remove(idx);
        if challenge.accept(user).is_err() {
            tracing::warn!(channel = %channel, "Settled challenge was still registered");
            return;
        }
        let Some(to) = challenge.to() else {
            return;
        };

        let game = Game::new(
            channel,
            challenge.from(),
            to,
            self.shared.config.game.board_width,
            self.shared.config.game.board_height,
            self.shared.config.game.random_start,
        );
        self.start_game(state, channel, game);
    }

    /// Announce a new game and begin its first turn
    fn start_game(&self, state: &mut ChannelState, channel: &str, mut game: Game) {
        let [player_one, player_two] = game.players();
        tracing::info!(
            channel = %channel,
            game_id = %game.id(),
            player_one = %player_one,
            player_two = %player_two,
            "Game started"
        );
        self.notify(
            channel,
            ChatEvent::GameStarted {
                player_one: player_one.to_string(),
                player_two: player_two.to_string(),
            },
        );

        self.begin_turn(channel, &mut game);
        state.games.push(game);
    }

    /// Render the board, announce whose turn began, and arm the turn
    /// timer
    fn begin_turn(&self, channel: &str, game: &mut Game) {
        self.render_board(channel, game);
        self.notify(
            channel,
            ChatEvent::TurnStarted {
                player: game.active_name().to_string(),
            },
        );

        let registry = self.clone();
        let timer_channel = channel.to_string();
        let (id, seq) = (game.id(), game.turn_seq());
        let handle = self.shared.scheduler.after(
            self.shared.config.game.timer_duration(),
            async move {
                registry.turn_timeout(timer_channel, id, seq).await;
            },
        );
        game.arm(handle);
    }

    /// Remove a finished game and announce its result
    fn finish_game(&self, state: &mut ChannelState, channel: &str, idx: usize, conclusion: Conclusion) {
        let mut game = state.games.remove(idx);
        game.disarm();

        self.render_board(channel, &game);
        match conclusion {
            Conclusion::Won(winner) => {
                tracing::info!(channel = %channel, game_id = %game.id(), winner = %winner, "Game won");
                self.notify(channel, ChatEvent::GameWon { winner });
            }
            Conclusion::Tied => {
                let [player_one, player_two] = game.players();
                tracing::info!(channel = %channel, game_id = %game.id(), "Game tied");
                self.notify(
                    channel,
                    ChatEvent::GameTied {
                        player_one: player_one.to_string(),
                        player_two: player_two.to_string(),
                    },
                );
            }
        }
    }

    fn render_board(&self, channel: &str, game: &Game) {
        let rows = game
            .board()
            .render(&self.shared.config.game.symbols)
            .collect();
        self.notify(channel, ChatEvent::Board { rows });
    }

    fn reject(&self, channel: &str, user: &str, reason: RejectReason) {
        self.notify(
            channel,
            ChatEvent::Rejected {
                user: user.to_string(),
                reason,
            },
        );
    }

    /// Broadcast a notification, best-effort
    ///
    /// A send with no live subscribers is not an error; transitions never
    /// roll back because nobody was listening.
    fn notify(&self, channel: &str, event: ChatEvent) {
        tracing::debug!(channel = %channel, event = ?event, "Broadcasting notification");
        let _ = self.shared.events_tx.send(Notification {
            channel: channel.to_string(),
            event,
        });
    }
}

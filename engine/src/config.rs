// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chatfour_core::Symbols;
use serde::{Deserialize, Serialize};

/// Program configuration
///
/// Read once at startup and treated as read-only for the lifetime of the
/// engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Channels the transport should join
    #[serde(default)]
    pub channels: Vec<String>,
    /// Command handling switches
    #[serde(default)]
    pub commands: CommandSettings,
    /// Game rules and timing
    #[serde(default)]
    pub game: GameSettings,
    /// Message templates for the transport
    #[serde(default)]
    pub localisation: Localisation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandSettings {
    /// Token every command starts with
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Whether the about/info/author commands are answered
    #[serde(default = "default_true")]
    pub author_attribution: bool,
    /// Whether moderators may toggle games on and off
    #[serde(default = "default_true")]
    pub mod_toggle: bool,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            author_attribution: true,
            mod_toggle: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GameSettings {
    /// Seconds a player has per turn, and a challenge has before expiring
    #[serde(default = "default_timer")]
    pub timer: u64,
    /// Chip symbols used to render the board
    #[serde(default)]
    pub symbols: Symbols,
    /// Board width in columns
    #[serde(default = "default_board_width")]
    pub board_width: usize,
    /// Board height in rows
    #[serde(default = "default_board_height")]
    pub board_height: usize,
    /// Whether several challenges/games may run in one channel at once
    #[serde(default = "default_true")]
    pub concurrent: bool,
    /// Whether the starting player is randomized
    #[serde(default = "default_true")]
    pub random_start: bool,
}

impl GameSettings {
    /// The turn/expiry timer as a [`Duration`]
    pub fn timer_duration(&self) -> Duration {
        Duration::from_secs(self.timer)
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            timer: default_timer(),
            symbols: Symbols::default(),
            board_width: default_board_width(),
            board_height: default_board_height(),
            concurrent: true,
            random_start: true,
        }
    }
}

/// Message templates
///
/// `%p%`, `%f%`, `%t%`, `%p1%`, and `%p2%` are replaced by the transport
/// when it renders engine events into chat text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Localisation {
    #[serde(default = "d_help")]
    pub help: String,
    #[serde(default = "d_game_start")]
    pub game_start: String,
    #[serde(default = "d_game_turn_start")]
    pub game_turn_start: String,
    #[serde(default = "d_game_tie")]
    pub game_tie: String,
    #[serde(default = "d_game_win")]
    pub game_win: String,
    #[serde(default = "d_challenge_send")]
    pub challenge_send: String,
    #[serde(default = "d_challenge_send_to")]
    pub challenge_send_to: String,
    #[serde(default = "d_challenge_expire")]
    pub challenge_expire: String,
    #[serde(default = "d_forfeit")]
    pub forfeit: String,
    #[serde(default = "d_forfeit_sent_challenge")]
    pub forfeit_sent_challenge: String,
    #[serde(default = "d_forfeit_decline_challenge")]
    pub forfeit_decline_challenge: String,
    #[serde(default = "d_toggle_enable")]
    pub toggle_enable: String,
    #[serde(default = "d_toggle_disable")]
    pub toggle_disable: String,
    #[serde(default = "d_shutdown_cancel_challenge")]
    pub shutdown_cancel_challenge: String,
    #[serde(default = "d_shutdown_cancel_game")]
    pub shutdown_cancel_game: String,
    #[serde(default = "d_error_generic")]
    pub error_generic: String,
    #[serde(default = "d_error_unknown_command")]
    pub error_unknown_command: String,
    #[serde(default = "d_error_already_ingame")]
    pub error_already_ingame: String,
    #[serde(default = "d_error_other_ingame")]
    pub error_other_ingame: String,
    #[serde(default = "d_error_not_ingame")]
    pub error_not_ingame: String,
    #[serde(default = "d_error_not_turn")]
    pub error_not_turn: String,
    #[serde(default = "d_error_no_column")]
    pub error_no_column: String,
    #[serde(default = "d_error_invalid_column")]
    pub error_invalid_column: String,
    #[serde(default = "d_error_already_challenging")]
    pub error_already_challenging: String,
    #[serde(default = "d_error_already_ongoing")]
    pub error_already_ongoing: String,
}

impl Default for Localisation {
    fn default() -> Self {
        Self {
            help: d_help(),
            game_start: d_game_start(),
            game_turn_start: d_game_turn_start(),
            game_tie: d_game_tie(),
            game_win: d_game_win(),
            challenge_send: d_challenge_send(),
            challenge_send_to: d_challenge_send_to(),
            challenge_expire: d_challenge_expire(),
            forfeit: d_forfeit(),
            forfeit_sent_challenge: d_forfeit_sent_challenge(),
            forfeit_decline_challenge: d_forfeit_decline_challenge(),
            toggle_enable: d_toggle_enable(),
            toggle_disable: d_toggle_disable(),
            shutdown_cancel_challenge: d_shutdown_cancel_challenge(),
            shutdown_cancel_game: d_shutdown_cancel_game(),
            error_generic: d_error_generic(),
            error_unknown_command: d_error_unknown_command(),
            error_already_ingame: d_error_already_ingame(),
            error_other_ingame: d_error_other_ingame(),
            error_not_ingame: d_error_not_ingame(),
            error_not_turn: d_error_not_turn(),
            error_no_column: d_error_no_column(),
            error_invalid_column: d_error_invalid_column(),
            error_already_challenging: d_error_already_challenging(),
            error_already_ongoing: d_error_already_ongoing(),
        }
    }
}

fn default_prefix() -> String {
    "c4!".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timer() -> u64 {
    180
}

fn default_board_width() -> usize {
    7
}

fn default_board_height() -> usize {
    6
}

fn d_help() -> String {
    "Use c4!play [user] to challenge a user to a game, or don't specify a user to challenge anyone!\n\
     Use c4!put [1-7] to make a move in a game.\n\
     Use c4!forfeit to forfeit a game, to cancel a challenge, or to decline a challenge."
        .to_string()
}

fn d_game_start() -> String {
    "The game between %p1% and %p2% has begun!".to_string()
}

fn d_game_turn_start() -> String {
    "%p%'s turn has begun! Use c4!put [1-7] to make a move.".to_string()
}

fn d_game_tie() -> String {
    "No player has won the game, sorry!".to_string()
}

fn d_game_win() -> String {
    "%p% has won the game! GG!".to_string()
}

fn d_challenge_send() -> String {
    "%f% has challenged any user to a game! Use c4!play or c4!play %f% to play!".to_string()
}

fn d_challenge_send_to() -> String {
    "%f% has challenged %t% to a game! Use c4!play %f% to accept!".to_string()
}

fn d_challenge_expire() -> String {
    "The Connect 4 challenge from %f% has expired.".to_string()
}

fn d_forfeit() -> String {
    "%p% has forfeited the game.".to_string()
}

fn d_forfeit_sent_challenge() -> String {
    "Successfully cancelled your challenge.".to_string()
}

fn d_forfeit_decline_challenge() -> String {
    "Sorry, %f%, but %t% declined your challenge.".to_string()
}

fn d_toggle_enable() -> String {
    "New Connect 4 games enabled!".to_string()
}

fn d_toggle_disable() -> String {
    "New Connect 4 games disabled!".to_string()
}

fn d_shutdown_cancel_challenge() -> String {
    "Sorry, %f%, but your challenge was cancelled because the bot shut down.".to_string()
}

fn d_shutdown_cancel_game() -> String {
    "Sorry, %p1% and %p2%, but your game was cut short because the bot shut down.".to_string()
}

fn d_error_generic() -> String {
    "Uh oh! Something went wrong.".to_string()
}

fn d_error_unknown_command() -> String {
    "Unknown command. Use c4!help for how to use the bot.".to_string()
}

fn d_error_already_ingame() -> String {
    "You can't be in two games at once, %p%!".to_string()
}

fn d_error_other_ingame() -> String {
    "Sorry, %f%, but %t% is already in a game!".to_string()
}

fn d_error_not_ingame() -> String {
    "You are currently not in a game!".to_string()
}

fn d_error_not_turn() -> String {
    "Please wait for your turn!".to_string()
}

fn d_error_no_column() -> String {
    "Please specify a column from 1 to 7.".to_string()
}

fn d_error_invalid_column() -> String {
    "You can't play there! Please try again.".to_string()
}

fn d_error_already_challenging() -> String {
    "You already have an outgoing challenge!".to_string()
}

fn d_error_already_ongoing() -> String {
    "Only one game can be played at a time!".to_string()
}

impl Config {
    /// Check configured values against their allowed ranges
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.game.timer >= 15,
            "game.timer must be at least 15 seconds, got {}",
            self.game.timer
        );
        anyhow::ensure!(
            (1..=500).contains(&self.game.board_width),
            "game.board-width must be between 1 and 500, got {}",
            self.game.board_width
        );
        anyhow::ensure!(
            (1..=500).contains(&self.game.board_height),
            "game.board-height must be between 1 and 500, got {}",
            self.game.board_height
        );
        anyhow::ensure!(
            !self.commands.prefix.is_empty(),
            "commands.prefix must not be empty"
        );
        Ok(())
    }

    /// Load the configuration from `path`, creating a default file if none
    /// exists yet
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("Config file not found, creating default at: {}", path.display());

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }

            let default_config = Self::default();
            let toml_content = toml::to_string_pretty(&default_config)
                .context("Failed to serialize default config")?;
            fs::write(path, toml_content).context("Failed to write default config file")?;

            return Ok(default_config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;

        Ok(config)
    }

    /// Write the configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command dispatcher
//!
//! Strips the command prefix, tokenizes the message, and forwards
//! validated intents to the registry. Replies that don't involve game
//! state (help, about, unknown command) are returned directly instead of
//! going through the engine.

use chatfour_engine::{ChannelRegistry, Config};

const ABOUT: &str =
    "chatfour is an open-source Connect 4 bot for chat channels. Licensed MIT OR Apache-2.0.";

/// Who sent a command, and with what standing
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    /// The channel the message arrived in
    pub channel: &'a str,
    /// The sending user
    pub user: &'a str,
    /// Whether the user may use moderator commands
    pub is_mod: bool,
}

/// Handle one chat message
///
/// Messages that don't start with the command prefix are ignored. Game
/// commands are silently dropped while games are disabled in the
/// channel; only `toggle` works then. Returns any direct replies to
/// send; engine-driven traffic arrives on the notification stream
/// instead.
pub async fn dispatch(
    registry: &ChannelRegistry,
    config: &Config,
    ctx: CommandContext<'_>,
    text: &str,
) -> Vec<String> {
    let mut tokens = text.split_whitespace();
    let Some(first) = tokens.next() else {
        return Vec::new();
    };
    let Some(command) = first.strip_prefix(&config.commands.prefix) else {
        return Vec::new();
    };

    registry.ensure_channel(ctx.channel).await;
    let enabled = registry.games_enabled(ctx.channel).await;
    let args: Vec<&str> = tokens.collect();

    tracing::debug!(
        channel = %ctx.channel,
        user = %ctx.user,
        command = %command,
        "Dispatching command"
    );

    match command {
        "accept" | "challenge" | "play" if enabled => {
            registry
                .request_play(ctx.channel, ctx.user, args.first().copied())
                .await;
            Vec::new()
        }
        "put" if enabled => {
            registry
                .request_move(ctx.channel, ctx.user, args.first().copied())
                .await;
            Vec::new()
        }
        "decline" | "forfeit" if enabled => {
            registry.request_forfeit(ctx.channel, ctx.user).await;
            Vec::new()
        }
        "help" if enabled => config
            .localisation
            .help
            .lines()
            .map(str::to_string)
            .collect(),
        "toggle" => {
            if !config.commands.mod_toggle {
                return vec![config.localisation.error_unknown_command.clone()];
            }
            // Non-moderators are ignored without a reply; answering would
            // just spam the channel.
            if ctx.is_mod {
                let now_enabled = !registry.games_enabled(ctx.channel).await;
                registry.set_games_enabled(ctx.channel, now_enabled).await;
            }
            Vec::new()
        }
        "author" | "info" | "about" if enabled => {
            if config.commands.author_attribution {
                vec![ABOUT.to_string()]
            } else {
                vec![config.localisation.error_unknown_command.clone()]
            }
        }
        _ if enabled => vec![config.localisation.error_unknown_command.clone()],
        _ => Vec::new(),
    }
}

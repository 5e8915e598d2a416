// SPDX-License-Identifier: MIT OR Apache-2.0

//! chatfour console transport
//!
//! Runs the game engine against stdin/stdout for local play and manual
//! testing. Each input line plays the role of one chat message:
//!
//! ```text
//! [#channel] [@]user message...
//! ```
//!
//! The channel defaults to the first configured channel; a leading `@`
//! marks the sender as a moderator. Engine notifications are printed as
//! they arrive, prefixed with their channel.

mod commands;
mod messages;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chatfour_engine::{ChannelRegistry, Config, Scheduler};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use commands::CommandContext;

#[derive(Parser)]
#[command(name = "chatfour", version, about = "Connect 4 played inside chat channels")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config).context("Failed to load configuration")?;

    let registry = ChannelRegistry::new(config.clone(), Scheduler::new());
    let printer = spawn_printer(&registry, &config);

    let default_channel = config
        .channels
        .first()
        .cloned()
        .unwrap_or_else(|| "lobby".to_string());

    println!("chatfour console. Lines look like chat messages:");
    println!("  [#channel] [@]user message     e.g.  alice {}play", config.commands.prefix);
    println!("A leading '@' marks the sender as a moderator. Ctrl-C quits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => match line.context("Failed to read from stdin")? {
                Some(line) => handle_line(&registry, &config, &default_channel, &line).await,
                None => break,
            },
        }
    }

    registry.shutdown().await;
    // Give the printer a beat to drain the shutdown notices.
    tokio::time::sleep(Duration::from_millis(100)).await;
    printer.abort();

    Ok(())
}

/// Print engine notifications as they arrive
fn spawn_printer(registry: &ChannelRegistry, config: &Config) -> tokio::task::JoinHandle<()> {
    let mut rx = registry.subscribe();
    let loc = config.localisation.clone();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(notification) => {
                    for line in messages::render(&loc, &notification.event) {
                        println!("[#{}] {}", notification.channel, line);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Notification printer lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn handle_line(
    registry: &ChannelRegistry,
    config: &Config,
    default_channel: &str,
    line: &str,
) {
    let Some((channel, user, is_mod, text)) = parse_line(default_channel, line) else {
        return;
    };

    let ctx = CommandContext {
        channel,
        user,
        is_mod,
    };
    for reply in commands::dispatch(registry, config, ctx, text).await {
        println!("[#{}] {}", channel, reply);
    }
}

/// Parse `[#channel] [@]user message...` into its parts
fn parse_line<'a>(
    default_channel: &'a str,
    line: &'a str,
) -> Option<(&'a str, &'a str, bool, &'a str)> {
    let line = line.trim();
    let (mut head, mut rest) = line.split_once(char::is_whitespace)?;

    let channel = match head.strip_prefix('#') {
        Some(channel) if !channel.is_empty() => {
            let (next, tail) = rest.trim_start().split_once(char::is_whitespace)?;
            head = next;
            rest = tail;
            channel
        }
        _ => default_channel,
    };

    let (is_mod, user) = match head.strip_prefix('@') {
        Some(user) => (true, user),
        None => (false, head),
    };

    let text = rest.trim_start();
    if user.is_empty() || text.is_empty() {
        return None;
    }
    Some((channel, user, is_mod, text))
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of engine events into chat text
//!
//! The engine emits parameters; wording comes from the localisation
//! table. `%p%`, `%f%`, `%t%`, `%p1%`, and `%p2%` placeholders are
//! replaced with the relevant user names.

use chatfour_engine::config::Localisation;
use chatfour_engine::{ChatEvent, RejectReason};

/// Replace each placeholder token with its value
fn fill(template: &str, replacements: &[(&str, &str)]) -> String {
    let mut message = template.to_string();
    for (token, value) in replacements {
        message = message.replace(token, value);
    }
    message
}

/// Render one engine event into chat lines
///
/// Most events render as a single line; a board render produces one line
/// per row.
pub fn render(loc: &Localisation, event: &ChatEvent) -> Vec<String> {
    match event {
        ChatEvent::ChallengeIssued { from, to: None } => {
            vec![fill(&loc.challenge_send, &[("%f%", from)])]
        }
        ChatEvent::ChallengeIssued { from, to: Some(to) } => {
            vec![fill(&loc.challenge_send_to, &[("%f%", from), ("%t%", to)])]
        }
        ChatEvent::ChallengeExpired { from } => {
            vec![fill(&loc.challenge_expire, &[("%f%", from)])]
        }
        ChatEvent::ChallengeCancelled { from } => {
            vec![fill(&loc.forfeit_sent_challenge, &[("%f%", from)])]
        }
        ChatEvent::ChallengeDeclined { from, to } => {
            vec![fill(&loc.forfeit_decline_challenge, &[("%f%", from), ("%t%", to)])]
        }
        ChatEvent::GameStarted {
            player_one,
            player_two,
        } => {
            vec![fill(
                &loc.game_start,
                &[("%p1%", player_one), ("%p2%", player_two)],
            )]
        }
        ChatEvent::TurnStarted { player } => {
            vec![fill(&loc.game_turn_start, &[("%p%", player)])]
        }
        ChatEvent::Board { rows } => rows.clone(),
        ChatEvent::GameWon { winner } => {
            vec![fill(&loc.game_win, &[("%p%", winner)])]
        }
        ChatEvent::GameTied {
            player_one,
            player_two,
        } => {
            vec![fill(
                &loc.game_tie,
                &[("%p1%", player_one), ("%p2%", player_two)],
            )]
        }
        ChatEvent::Forfeited { player } => {
            vec![fill(&loc.forfeit, &[("%p%", player)])]
        }
        ChatEvent::GamesToggled { enabled: true } => vec![loc.toggle_enable.clone()],
        ChatEvent::GamesToggled { enabled: false } => vec![loc.toggle_disable.clone()],
        ChatEvent::ChallengeAborted { from } => {
            vec![fill(&loc.shutdown_cancel_challenge, &[("%f%", from)])]
        }
        ChatEvent::GameAborted {
            player_one,
            player_two,
        } => {
            vec![fill(
                &loc.shutdown_cancel_game,
                &[("%p1%", player_one), ("%p2%", player_two)],
            )]
        }
        ChatEvent::Rejected { user, reason } => vec![render_rejection(loc, user, reason)],
    }
}

fn render_rejection(loc: &Localisation, user: &str, reason: &RejectReason) -> String {
    match reason {
        RejectReason::AlreadyInGame => fill(&loc.error_already_ingame, &[("%p%", user)]),
        RejectReason::AlreadyChallenging => {
            fill(&loc.error_already_challenging, &[("%p%", user)])
        }
        RejectReason::TargetInGame { target } => {
            fill(&loc.error_other_ingame, &[("%f%", user), ("%t%", target)])
        }
        RejectReason::AlreadyOngoing => fill(&loc.error_already_ongoing, &[("%p%", user)]),
        RejectReason::Generic => loc.error_generic.clone(),
        RejectReason::NotInGame => fill(&loc.error_not_ingame, &[("%p%", user)]),
        RejectReason::NotYourTurn => fill(&loc.error_not_turn, &[("%p%", user)]),
        RejectReason::NoColumnSpecified => loc.error_no_column.clone(),
        RejectReason::InvalidColumn => fill(&loc.error_invalid_column, &[("%p%", user)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_filled() {
        let loc = Localisation::default();

        let lines = render(
            &loc,
            &ChatEvent::ChallengeIssued {
                from: "alice".to_string(),
                to: Some("bob".to_string()),
            },
        );
        assert_eq!(
            lines,
            vec!["alice has challenged bob to a game! Use c4!play alice to accept!".to_string()]
        );

        let lines = render(
            &loc,
            &ChatEvent::GameWon {
                winner: "bob".to_string(),
            },
        );
        assert_eq!(lines, vec!["bob has won the game! GG!".to_string()]);
    }

    #[test]
    fn board_renders_one_line_per_row() {
        let loc = Localisation::default();
        let rows = vec!["⚫⚫".to_string(), "🟠🔵".to_string()];
        let lines = render(&loc, &ChatEvent::Board { rows: rows.clone() });
        assert_eq!(lines, rows);
    }

    #[test]
    fn rejections_use_their_error_templates() {
        let loc = Localisation::default();

        let lines = render(
            &loc,
            &ChatEvent::Rejected {
                user: "alice".to_string(),
                reason: RejectReason::AlreadyInGame,
            },
        );
        assert_eq!(lines, vec!["You can't be in two games at once, alice!".to_string()]);

        let lines = render(
            &loc,
            &ChatEvent::Rejected {
                user: "carol".to_string(),
                reason: RejectReason::TargetInGame {
                    target: "dave".to_string(),
                },
            },
        );
        assert_eq!(lines, vec!["Sorry, carol, but dave is already in a game!".to_string()]);
    }
}

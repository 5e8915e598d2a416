// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use chatfour_engine::{ChannelRegistry, ChatEvent, Config, Notification, RejectReason, Scheduler};
use tokio::sync::broadcast;

const CH: &str = "somechannel";

fn test_config() -> Config {
    let mut config = Config::default();
    config.game.random_start = false;
    config
}

fn registry_with(config: Config) -> (ChannelRegistry, broadcast::Receiver<Notification>) {
    let registry = ChannelRegistry::new(config, Scheduler::new());
    let rx = registry.subscribe();
    (registry, rx)
}

fn registry() -> (ChannelRegistry, broadcast::Receiver<Notification>) {
    registry_with(test_config())
}

async fn next_notification(rx: &mut broadcast::Receiver<Notification>) -> Notification {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a notification")
        .expect("notification stream closed")
}

async fn next_event(rx: &mut broadcast::Receiver<Notification>) -> ChatEvent {
    next_notification(rx).await.event
}

async fn assert_idle(rx: &mut broadcast::Receiver<Notification>) {
    let quiet = tokio::time::timeout(Duration::from_millis(10), rx.recv()).await;
    assert!(quiet.is_err(), "expected no notification, got {:?}", quiet);
}

/// Consume the board render + turn announcement emitted for a new turn
async fn expect_turn(rx: &mut broadcast::Receiver<Notification>, player: &str) -> Vec<String> {
    let ChatEvent::Board { rows } = next_event(rx).await else {
        panic!("expected a board render");
    };
    assert_eq!(
        next_event(rx).await,
        ChatEvent::TurnStarted {
            player: player.to_string()
        }
    );
    rows
}

/// Start a game between `from` and `to` and consume the startup events
async fn start_game(
    registry: &ChannelRegistry,
    rx: &mut broadcast::Receiver<Notification>,
    from: &str,
    to: &str,
) {
    registry.request_play(CH, from, None).await;
    assert_eq!(
        next_event(rx).await,
        ChatEvent::ChallengeIssued {
            from: from.to_string(),
            to: None
        }
    );

    registry.request_play(CH, to, None).await;
    assert_eq!(
        next_event(rx).await,
        ChatEvent::GameStarted {
            player_one: from.to_string(),
            player_two: to.to_string()
        }
    );
    expect_turn(rx, from).await;
}

#[tokio::test(start_paused = true)]
async fn open_challenge_is_bound_and_accepted() {
    let (registry, mut rx) = registry();

    registry.request_play(CH, "alice", None).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::ChallengeIssued {
            from: "alice".to_string(),
            to: None
        }
    );
    assert!(registry.find_challenge_for(CH, "alice").await.is_some());

    registry.request_play(CH, "bob", None).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::GameStarted {
            player_one: "alice".to_string(),
            player_two: "bob".to_string()
        }
    );
    let rows = expect_turn(&mut rx, "alice").await;
    assert_eq!(rows.len(), 6);

    assert!(registry.find_challenge_for(CH, "alice").await.is_none());
    let game = registry.find_game_for(CH, "alice").await;
    assert!(game.is_some());
    assert_eq!(game, registry.find_game_for(CH, "bob").await);
}

#[tokio::test(start_paused = true)]
async fn outgoing_challenge_cannot_be_duplicated() {
    let (registry, mut rx) = registry();

    registry.request_play(CH, "alice", None).await;
    next_event(&mut rx).await;

    registry.request_play(CH, "alice", None).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::Rejected {
            user: "alice".to_string(),
            reason: RejectReason::AlreadyChallenging
        }
    );
}

#[tokio::test(start_paused = true)]
async fn players_in_a_game_cannot_play_again() {
    let (registry, mut rx) = registry();
    start_game(&registry, &mut rx, "alice", "bob").await;

    registry.request_play(CH, "alice", None).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::Rejected {
            user: "alice".to_string(),
            reason: RejectReason::AlreadyInGame
        }
    );

    registry.request_play(CH, "carol", Some("alice")).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::Rejected {
            user: "carol".to_string(),
            reason: RejectReason::TargetInGame {
                target: "alice".to_string()
            }
        }
    );
}

#[tokio::test(start_paused = true)]
async fn targeted_challenge_is_only_acceptable_by_its_target() {
    let (registry, mut rx) = registry();

    registry.request_play(CH, "alice", Some("bob")).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::ChallengeIssued {
            from: "alice".to_string(),
            to: Some("bob".to_string())
        }
    );

    registry.request_play(CH, "carol", Some("alice")).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::Rejected {
            user: "carol".to_string(),
            reason: RejectReason::Generic
        }
    );

    registry.request_play(CH, "bob", Some("alice")).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::GameStarted {
            player_one: "alice".to_string(),
            player_two: "bob".to_string()
        }
    );
    expect_turn(&mut rx, "alice").await;
}

#[tokio::test(start_paused = true)]
async fn identities_compare_case_insensitively() {
    let (registry, mut rx) = registry();

    registry.request_play(CH, "Alice", Some("BOB")).await;
    next_event(&mut rx).await;

    // The acceptor's spelling wins when the challenge is bound.
    registry.request_play(CH, "bob", Some("ALICE")).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::GameStarted {
            player_one: "Alice".to_string(),
            player_two: "bob".to_string()
        }
    );
    expect_turn(&mut rx, "Alice").await;

    registry.request_move(CH, "ALICE", Some("1")).await;
    expect_turn(&mut rx, "bob").await;
}

#[tokio::test(start_paused = true)]
async fn no_target_play_ignores_incoming_targeted_challenges() {
    let (registry, mut rx) = registry();

    registry.request_play(CH, "alice", Some("bob")).await;
    next_event(&mut rx).await;

    // Only open challenges are matched; bob opens his own instead of
    // accepting the one addressed to him.
    registry.request_play(CH, "bob", None).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::ChallengeIssued {
            from: "bob".to_string(),
            to: None
        }
    );
}

#[tokio::test(start_paused = true)]
async fn third_user_opens_a_new_challenge_while_a_game_runs() {
    let (registry, mut rx) = registry();
    start_game(&registry, &mut rx, "alice", "bob").await;

    registry.request_play(CH, "carol", None).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::ChallengeIssued {
            from: "carol".to_string(),
            to: None
        }
    );
}

#[tokio::test(start_paused = true)]
async fn concurrency_gate_allows_only_one_ongoing_entry() {
    let mut config = test_config();
    config.game.concurrent = false;
    let (registry, mut rx) = registry_with(config);

    registry.request_play(CH, "alice", Some("bob")).await;
    next_event(&mut rx).await;

    registry.request_play(CH, "carol", None).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::Rejected {
            user: "carol".to_string(),
            reason: RejectReason::AlreadyOngoing
        }
    );

    registry.request_play(CH, "carol", Some("dave")).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::Rejected {
            user: "carol".to_string(),
            reason: RejectReason::AlreadyOngoing
        }
    );

    // The gate also applies while the resulting game is running.
    registry.request_play(CH, "bob", Some("alice")).await;
    next_event(&mut rx).await;
    expect_turn(&mut rx, "alice").await;

    registry.request_play(CH, "carol", None).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::Rejected {
            user: "carol".to_string(),
            reason: RejectReason::AlreadyOngoing
        }
    );
}

#[tokio::test(start_paused = true)]
async fn moves_are_validated_before_touching_the_board() {
    let (registry, mut rx) = registry();
    start_game(&registry, &mut rx, "alice", "bob").await;

    registry.request_move(CH, "carol", Some("4")).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::Rejected {
            user: "carol".to_string(),
            reason: RejectReason::NotInGame
        }
    );

    registry.request_move(CH, "bob", Some("4")).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::Rejected {
            user: "bob".to_string(),
            reason: RejectReason::NotYourTurn
        }
    );

    registry.request_move(CH, "alice", None).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::Rejected {
            user: "alice".to_string(),
            reason: RejectReason::NoColumnSpecified
        }
    );

    for bad in ["four", "0", "8", "-1"] {
        registry.request_move(CH, "alice", Some(bad)).await;
        assert_eq!(
            next_event(&mut rx).await,
            ChatEvent::Rejected {
                user: "alice".to_string(),
                reason: RejectReason::InvalidColumn
            },
            "column argument {:?} should be rejected",
            bad
        );
    }

    // The rejections left the board untouched and the turn unchanged.
    registry.request_move(CH, "alice", Some("4")).await;
    expect_turn(&mut rx, "bob").await;
}

#[tokio::test(start_paused = true)]
async fn vertical_four_wins_and_removes_the_game() {
    let (registry, mut rx) = registry();
    start_game(&registry, &mut rx, "alice", "bob").await;

    for _ in 0..3 {
        registry.request_move(CH, "alice", Some("1")).await;
        expect_turn(&mut rx, "bob").await;
        registry.request_move(CH, "bob", Some("2")).await;
        expect_turn(&mut rx, "alice").await;
    }

    registry.request_move(CH, "alice", Some("1")).await;
    assert!(matches!(next_event(&mut rx).await, ChatEvent::Board { .. }));
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::GameWon {
            winner: "alice".to_string()
        }
    );

    assert!(registry.find_game_for(CH, "alice").await.is_none());
    assert!(registry.find_game_for(CH, "bob").await.is_none());
}

#[tokio::test(start_paused = true)]
async fn uniform_top_row_ends_in_a_tie() {
    let mut config = test_config();
    config.game.board_width = 1;
    config.game.board_height = 2;
    let (registry, mut rx) = registry_with(config);
    start_game(&registry, &mut rx, "alice", "bob").await;

    registry.request_move(CH, "alice", Some("1")).await;
    expect_turn(&mut rx, "bob").await;

    registry.request_move(CH, "bob", Some("1")).await;
    assert!(matches!(next_event(&mut rx).await, ChatEvent::Board { .. }));
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::GameTied {
            player_one: "alice".to_string(),
            player_two: "bob".to_string()
        }
    );
    assert!(registry.find_game_for(CH, "alice").await.is_none());
}

#[tokio::test(start_paused = true)]
async fn forfeit_awards_the_other_player() {
    let (registry, mut rx) = registry();
    start_game(&registry, &mut rx, "alice", "bob").await;

    registry.request_forfeit(CH, "bob").await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::Forfeited {
            player: "bob".to_string()
        }
    );
    assert!(matches!(next_event(&mut rx).await, ChatEvent::Board { .. }));
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::GameWon {
            winner: "alice".to_string()
        }
    );
    assert!(registry.find_game_for(CH, "bob").await.is_none());
}

#[tokio::test(start_paused = true)]
async fn forfeit_withdraws_an_outgoing_challenge() {
    let (registry, mut rx) = registry();

    registry.request_play(CH, "alice", Some("bob")).await;
    next_event(&mut rx).await;

    registry.request_forfeit(CH, "alice").await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::ChallengeCancelled {
            from: "alice".to_string()
        }
    );
    assert!(registry.find_challenge_for(CH, "alice").await.is_none());

    registry.request_forfeit(CH, "bob").await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::Rejected {
            user: "bob".to_string(),
            reason: RejectReason::NotInGame
        }
    );
}

#[tokio::test(start_paused = true)]
async fn forfeit_declines_an_incoming_challenge() {
    let (registry, mut rx) = registry();

    registry.request_play(CH, "alice", Some("bob")).await;
    next_event(&mut rx).await;

    registry.request_forfeit(CH, "bob").await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::ChallengeDeclined {
            from: "alice".to_string(),
            to: "bob".to_string()
        }
    );
    assert!(registry.find_challenge_for(CH, "alice").await.is_none());
}

#[tokio::test(start_paused = true)]
async fn unaccepted_challenges_expire() {
    let (registry, mut rx) = registry();

    registry.request_play(CH, "alice", None).await;
    next_event(&mut rx).await;

    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_secs(181)).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::ChallengeExpired {
            from: "alice".to_string()
        }
    );
    assert!(registry.find_challenge_for(CH, "alice").await.is_none());

    // An expired challenge cannot be accepted; a later play starts over.
    registry.request_play(CH, "bob", None).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::ChallengeIssued {
            from: "bob".to_string(),
            to: None
        }
    );
}

#[tokio::test(start_paused = true)]
async fn turn_timer_forfeits_the_active_player() {
    let (registry, mut rx) = registry();
    start_game(&registry, &mut rx, "alice", "bob").await;

    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_secs(181)).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::Forfeited {
            player: "alice".to_string()
        }
    );
    assert!(matches!(next_event(&mut rx).await, ChatEvent::Board { .. }));
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::GameWon {
            winner: "bob".to_string()
        }
    );
    assert!(registry.find_game_for(CH, "alice").await.is_none());
    // Accepting the challenge cancelled its expiry timer, so nothing
    // else fires.
    assert_idle(&mut rx).await;
}

#[tokio::test(start_paused = true)]
async fn each_completed_turn_rearms_the_timer() {
    let (registry, mut rx) = registry();
    start_game(&registry, &mut rx, "alice", "bob").await;

    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_secs(100)).await;
    registry.request_move(CH, "alice", Some("1")).await;
    expect_turn(&mut rx, "bob").await;

    // 200 seconds into the game, but only 100 into bob's turn.
    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_secs(100)).await;
    assert_idle(&mut rx).await;

    tokio::time::advance(Duration::from_secs(81)).await;
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::Forfeited {
            player: "bob".to_string()
        }
    );
    assert!(matches!(next_event(&mut rx).await, ChatEvent::Board { .. }));
    assert_eq!(
        next_event(&mut rx).await,
        ChatEvent::GameWon {
            winner: "alice".to_string()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_every_challenge_and_game() {
    let (registry, mut rx) = registry();

    registry.request_play("chan-a", "alice", None).await;
    next_event(&mut rx).await;

    registry.request_play("chan-b", "carol", None).await;
    next_event(&mut rx).await;
    registry.request_play("chan-b", "dave", None).await;
    next_event(&mut rx).await;
    expect_turn(&mut rx, "carol").await;

    registry.shutdown().await;

    let mut aborted_challenges = 0;
    let mut aborted_games = 0;
    for _ in 0..2 {
        let notification = next_notification(&mut rx).await;
        match notification.event {
            ChatEvent::ChallengeAborted { ref from } => {
                assert_eq!(notification.channel, "chan-a");
                assert_eq!(from, "alice");
                aborted_challenges += 1;
            }
            ChatEvent::GameAborted {
                ref player_one,
                ref player_two,
            } => {
                assert_eq!(notification.channel, "chan-b");
                assert_eq!(player_one, "carol");
                assert_eq!(player_two, "dave");
                aborted_games += 1;
            }
            other => panic!("unexpected event at shutdown: {:?}", other),
        }
    }
    assert_eq!(aborted_challenges, 1);
    assert_eq!(aborted_games, 1);

    assert!(registry.find_challenge_for("chan-a", "alice").await.is_none());
    assert!(registry.find_game_for("chan-b", "carol").await.is_none());

    // No timers survive shutdown.
    tokio::time::advance(Duration::from_secs(600)).await;
    assert_idle(&mut rx).await;
}

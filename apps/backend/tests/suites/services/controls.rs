use hashtag_backend::domain::{ChannelId, PlayerId};
use hashtag_backend::services::StartReport;
use hashtag_backend::{ErrorCode, GameConfig, SessionEvent};

use crate::support::game_setup::{config, test_game};

fn auto_start_config(min_players: usize) -> GameConfig {
    GameConfig {
        min_players,
        ..config(1, 2)
    }
}

#[tokio::test]
async fn auto_start_waits_for_the_threshold() {
    let game = test_game(4, auto_start_config(6));
    let report = game.state.bot().handle_member_joined(&game.channel).await.unwrap();
    assert_eq!(report, StartReport::Skipped);
    assert!(!game.state.coordinator().is_active());
    assert!(game.messenger.deliveries().is_empty());
}

#[tokio::test]
async fn auto_start_begins_a_session_once() {
    let game = test_game(4, auto_start_config(4));
    let bot = game.state.bot();

    let report = bot.handle_member_joined(&game.channel).await.unwrap();
    assert!(matches!(report, StartReport::Started(p) if p.current_trial == 1));
    assert_eq!(
        game.messenger.broadcasts()[0],
        SessionEvent::Started {
            players: 4,
            trials: 1
        }
    );

    let again = bot.handle_member_joined(&game.channel).await.unwrap();
    assert_eq!(again, StartReport::Skipped);
    assert_eq!(game.messenger.prompts().len(), 4);
}

#[tokio::test]
async fn other_channels_never_auto_start() {
    let game = test_game(4, auto_start_config(2));
    let elsewhere = ChannelId::from("C-elsewhere");
    game.messenger
        .set_members(&elsewhere, game.players.iter().cloned());

    let report = game.state.bot().handle_member_joined(&elsewhere).await.unwrap();
    assert_eq!(report, StartReport::Skipped);
    assert!(game.messenger.deliveries().is_empty());
}

#[tokio::test]
async fn start_command_is_rejected_while_rounds_are_open() {
    let game = test_game(4, config(1, 2));
    let bot = game.state.bot();

    let first = bot.handle_mention(&game.channel, "<@bot> start").await.unwrap();
    assert!(matches!(first, Some(StartReport::Started(_))));

    let second = bot.handle_mention(&game.channel, "START again").await.unwrap();
    assert_eq!(second, Some(StartReport::Rejected));
    assert!(game
        .messenger
        .broadcasts()
        .iter()
        .any(|e| matches!(e, SessionEvent::StartRejected { .. })));
    assert_eq!(game.sink.session_count(), 1);
}

#[tokio::test]
async fn odd_roster_reports_a_failed_start() {
    let game = test_game(5, config(1, 2));
    let report = game
        .state
        .bot()
        .handle_mention(&game.channel, "start")
        .await
        .unwrap();
    assert_eq!(report, Some(StartReport::Failed(ErrorCode::InvalidPlayerCount)));
    assert!(game
        .messenger
        .broadcasts()
        .iter()
        .any(|e| matches!(e, SessionEvent::StartFailed { .. })));
    assert!(game.messenger.prompts().is_empty());
}

#[tokio::test]
async fn scores_lists_every_member_even_without_points() {
    let game = test_game(4, config(1, 2));
    let report = game
        .state
        .bot()
        .handle_mention(&game.channel, "what are the Scores?")
        .await
        .unwrap();
    assert_eq!(report, None);

    let Some(SessionEvent::Leaderboard(standings)) = game.messenger.broadcasts().pop() else {
        panic!("expected a leaderboard broadcast");
    };
    assert_eq!(standings.len(), 4);
    assert!(standings.iter().all(|s| s.points == 0));
    let ids: Vec<_> = standings.iter().map(|s| s.player.clone()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn anything_else_gets_help() {
    let game = test_game(4, config(1, 2));
    game.state
        .bot()
        .handle_mention(&game.channel, "hello there")
        .await
        .unwrap();
    assert_eq!(game.messenger.broadcasts(), vec![SessionEvent::Help]);
}

#[tokio::test]
async fn scores_follow_the_session_roster_not_later_joiners() {
    let game = test_game(4, config(1, 2));
    let bot = game.state.bot();
    bot.handle_mention(&game.channel, "start").await.unwrap();

    let mut members = game.players.clone();
    members.push(PlayerId::new("U-late-joiner"));
    game.messenger.set_members(&game.channel, members);

    bot.handle_mention(&game.channel, "scores").await.unwrap();
    let Some(SessionEvent::Leaderboard(standings)) = game.messenger.broadcasts().pop() else {
        panic!("expected a leaderboard broadcast");
    };
    assert_eq!(standings.len(), 4);
    assert!(standings.iter().all(|s| game.players.contains(&s.player)));
}

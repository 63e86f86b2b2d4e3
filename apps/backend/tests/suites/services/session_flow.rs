use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use hashtag_backend::domain::{PlayerId, RoundOutcome, SubmitEffect};
use hashtag_backend::services::Advance;
use hashtag_backend::{GameConfig, SessionEvent};
use tokio::task::JoinSet;

use crate::support::game_setup::{config, test_game};
use crate::support::session_driver::{answer_trial, wait_finished};

#[tokio::test]
async fn twenty_players_agreeing_every_trial_score_five_each() {
    let game = test_game(20, config(5, 4));
    let coordinator = game.state.coordinator();

    coordinator
        .start_session(game.channel.clone(), game.players.clone(), game.params())
        .await
        .unwrap();

    for trial in 1..=5 {
        let prompts = game.messenger.prompts_for_trial(trial);
        assert_eq!(prompts.len(), 20, "trial {trial} prompts every player once");
        let prompted: HashSet<&PlayerId> = prompts.iter().map(|p| &p.player).collect();
        assert_eq!(prompted.len(), 20);

        let effects = answer_trial(&game, trial, |_| "#Sunset".to_string()).await;
        let closed = effects
            .iter()
            .filter(|e| **e == SubmitEffect::Closed(RoundOutcome::Match))
            .count();
        assert_eq!(closed, 10);
    }

    wait_finished(coordinator).await;

    for player in &game.players {
        assert_eq!(coordinator.ledger().points(player), 5);
    }
    let top = coordinator.top(3);
    assert_eq!(top.len(), 3);
    let mut expected: Vec<PlayerId> = game.players.clone();
    expected.sort();
    assert_eq!(
        top.iter().map(|s| s.player.clone()).collect::<Vec<_>>(),
        expected[..3].to_vec()
    );

    let rows = game.sink.records();
    assert_eq!(rows.len(), 50);
    assert!(rows.iter().all(|r| r.game_outcome == "match" && r.completed == 1));
    assert!(game
        .messenger
        .broadcasts()
        .contains(&SessionEvent::Completed));
}

#[tokio::test]
async fn next_trial_waits_for_every_round() {
    let game = test_game(4, config(2, 2));
    let coordinator = game.state.coordinator();
    coordinator
        .start_session(game.channel.clone(), game.players.clone(), game.params())
        .await
        .unwrap();

    let prompts = game.messenger.prompts_for_trial(1);
    let first_round = prompts[0].round;
    for prompt in prompts.iter().filter(|p| p.round == first_round) {
        coordinator
            .submit(prompt.round, &prompt.player, "#one")
            .await;
    }

    assert!(game.messenger.prompts_for_trial(2).is_empty());
    assert_eq!(coordinator.maybe_advance().await, Advance::Waiting);
    assert_eq!(coordinator.progress().current_trial, 1);

    for prompt in prompts.iter().filter(|p| p.round != first_round) {
        coordinator
            .submit(prompt.round, &prompt.player, "#two")
            .await;
    }

    assert_eq!(game.messenger.prompts_for_trial(2).len(), 4);
    assert_eq!(coordinator.progress().current_trial, 2);
    assert!(!coordinator.progress().finished);
}

#[tokio::test]
async fn repeated_advance_opens_each_trial_once() {
    let game = test_game(4, config(2, 2));
    let coordinator = game.state.coordinator();
    coordinator
        .start_session(game.channel.clone(), game.players.clone(), game.params())
        .await
        .unwrap();

    answer_trial(&game, 1, |p| format!("#{p}")).await;
    for _ in 0..3 {
        assert_eq!(coordinator.maybe_advance().await, Advance::Waiting);
    }
    let opened = game
        .messenger
        .broadcasts()
        .into_iter()
        .filter(|e| *e == SessionEvent::TrialOpened { trial: 2 })
        .count();
    assert_eq!(opened, 1);
    assert_eq!(game.messenger.prompts_for_trial(2).len(), 4);
}

#[tokio::test]
async fn finished_session_stays_finished() {
    let game = test_game(4, config(1, 2));
    let coordinator = game.state.coordinator();
    coordinator
        .start_session(game.channel.clone(), game.players.clone(), game.params())
        .await
        .unwrap();

    answer_trial(&game, 1, |_| "#x".to_string()).await;
    wait_finished(coordinator).await;

    assert_eq!(coordinator.maybe_advance().await, Advance::AlreadyFinished);
    let completed = game
        .messenger
        .broadcasts()
        .into_iter()
        .filter(|e| *e == SessionEvent::Completed)
        .count();
    assert_eq!(completed, 1);
}

#[tokio::test]
async fn ledger_carries_over_into_the_next_session() {
    let game = test_game(4, config(1, 2));
    let coordinator = game.state.coordinator();

    for generation in 1..=2u64 {
        let progress = coordinator
            .start_session(game.channel.clone(), game.players.clone(), game.params())
            .await
            .unwrap();
        assert_eq!(progress.generation, generation);
        answer_trial(&game, 1, |_| "#same".to_string()).await;
        wait_finished(coordinator).await;
    }

    for player in &game.players {
        assert_eq!(coordinator.ledger().points(player), 2);
    }
    assert_eq!(game.sink.session_count(), 2);
}

#[tokio::test]
async fn stale_round_ids_from_previous_session_are_ignored() {
    let game = test_game(4, config(1, 2));
    let coordinator = game.state.coordinator();
    coordinator
        .start_session(game.channel.clone(), game.players.clone(), game.params())
        .await
        .unwrap();
    let old = game.messenger.prompts_for_trial(1);
    answer_trial(&game, 1, |_| "#a".to_string()).await;
    wait_finished(coordinator).await;

    game.messenger.clear();
    coordinator
        .start_session(game.channel.clone(), game.players.clone(), game.params())
        .await
        .unwrap();

    let effect = coordinator
        .submit(old[0].round, &old[0].player, "#a")
        .await;
    assert!(matches!(effect, SubmitEffect::Ignored(_)));
    assert!(coordinator.is_active());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_answers_and_timeouts_keep_the_trial_barrier() {
    let trials = 4;
    let game = test_game(
        10,
        GameConfig {
            round_timeout: Duration::from_millis(200),
            ..config(trials, 4)
        },
    );
    let coordinator = game.state.coordinator();
    coordinator
        .start_session(game.channel.clone(), game.players.clone(), game.params())
        .await
        .unwrap();

    for trial in 1..=trials {
        let prompts = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let prompts = game.messenger.prompts_for_trial(trial);
                if prompts.len() == 10 {
                    return prompts;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("trial should open");

        // One round per trial stays silent and closes on its timer.
        let silent = prompts[0].round;
        let mut tasks = JoinSet::new();
        for prompt in prompts.into_iter().filter(|p| p.round != silent) {
            let coordinator = Arc::clone(coordinator);
            tasks.spawn(async move {
                coordinator
                    .submit(prompt.round, &prompt.player, "#together")
                    .await
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap();
        }
    }

    tokio::time::timeout(Duration::from_secs(5), wait_finished(coordinator))
        .await
        .expect("session should finish");

    let broadcasts = game.messenger.broadcasts();
    for trial in 1..=trials {
        let opened = broadcasts
            .iter()
            .filter(|e| **e == SessionEvent::TrialOpened { trial })
            .count();
        assert_eq!(opened, 1, "trial {trial} opened once");
    }
    let completed = broadcasts
        .iter()
        .filter(|e| **e == SessionEvent::Completed)
        .count();
    assert_eq!(completed, 1);

    let rows = game.sink.records();
    let ids: HashSet<&str> = rows.iter().map(|r| r.round_id.as_str()).collect();
    assert_eq!(rows.len(), 5 * trials as usize);
    assert_eq!(ids.len(), rows.len());
    let timeouts = rows.iter().filter(|r| r.game_outcome == "timeout").count();
    assert!(timeouts >= trials as usize);
}

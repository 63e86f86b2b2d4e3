//! Game fixtures: an assembled state with recording collaborators.

use std::sync::Arc;
use std::time::Duration;

use hashtag_backend::domain::{ChannelId, PlayerId};
use hashtag_backend::messaging::memory::RecordingMessenger;
use hashtag_backend::{build_state, AppState, GameConfig, MemoryRecordSink, SessionParams};
use hashtag_test_support::unique_helpers::{unique_player_ids, unique_str};

pub struct TestGame {
    pub state: AppState,
    pub messenger: Arc<RecordingMessenger>,
    pub sink: Arc<MemoryRecordSink>,
    pub channel: ChannelId,
    pub players: Vec<PlayerId>,
}

impl TestGame {
    pub fn params(&self) -> SessionParams {
        SessionParams::from_config(&self.state.config)
    }
}

/// Small game config: `trials` trials, ring window `neighbor_size`.
pub fn config(trials: u32, neighbor_size: usize) -> GameConfig {
    GameConfig {
        trials,
        neighbor_size,
        round_timeout: Duration::from_secs(60),
        ..GameConfig::default()
    }
}

/// Assemble a game whose channel holds `player_count` members.
pub fn test_game(player_count: usize, config: GameConfig) -> TestGame {
    let channel = ChannelId::new(unique_str("C"));
    let players: Vec<PlayerId> = unique_player_ids(player_count)
        .into_iter()
        .map(PlayerId::new)
        .collect();

    let config = GameConfig {
        game_channel: Some(channel.clone()),
        ..config
    };
    let messenger = Arc::new(RecordingMessenger::new());
    messenger.set_members(&channel, players.iter().cloned());
    let sink = Arc::new(MemoryRecordSink::new());

    let state = build_state()
        .with_config(config)
        .with_messenger(messenger.clone())
        .with_record_sink(sink.clone())
        .build()
        .expect("state should build");

    TestGame {
        state,
        messenger,
        sink,
        channel,
        players,
    }
}

use std::sync::Arc;

use hashtag_backend::domain::{ChannelId, PlayerId};
use hashtag_backend::messaging::memory::RecordingMessenger;
use hashtag_backend::{build_state, GameConfig, SessionParams};

use crate::support::game_setup::config;
use crate::support::session_driver::wait_finished;

#[tokio::test]
async fn session_writes_one_csv_file_with_header_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let channel = ChannelId::from("C1");
    let players: Vec<PlayerId> = ["U1", "U2", "U3", "U4"].into_iter().map(PlayerId::from).collect();

    let messenger = Arc::new(RecordingMessenger::new());
    let state = build_state()
        .with_config(GameConfig {
            export_dir: dir.path().to_path_buf(),
            ..config(1, 2)
        })
        .with_messenger(messenger.clone())
        .build()
        .unwrap();
    let coordinator = state.coordinator();

    coordinator
        .start_session(channel, players, SessionParams::from_config(&state.config))
        .await
        .unwrap();
    for prompt in messenger.prompts_for_trial(1) {
        coordinator
            .submit(prompt.round, &prompt.player, "#Same")
            .await;
    }
    wait_finished(coordinator).await;

    let files: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with("submissions_") && name.ends_with(".csv"), "{name}");

    let mut reader = csv::Reader::from_path(&files[0]).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(
        header,
        [
            "round_id",
            "trial",
            "player_a",
            "player_b",
            "player_a_hashtag",
            "player_b_hashtag",
            "completed",
            "started_at",
            "game_outcome"
        ]
    );
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(&row[1], "1");
        assert_eq!(&row[4], "same");
        assert_eq!(&row[5], "same");
        assert_eq!(&row[6], "1");
        assert_eq!(&row[8], "match");
        assert!(row[0].len() == 32 && row[0].chars().all(|c| c.is_ascii_hexdigit()));
    }
}

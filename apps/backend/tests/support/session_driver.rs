//! Helpers that play the game through the coordinator.

use hashtag_backend::domain::SubmitEffect;
use hashtag_backend::SessionCoordinator;
use std::sync::Arc;

use super::game_setup::TestGame;

/// Every player of `trial` answers with `tag_for(player)`.
pub async fn answer_trial(
    game: &TestGame,
    trial: u32,
    tag_for: impl Fn(&str) -> String,
) -> Vec<SubmitEffect> {
    let coordinator = game.state.coordinator();
    let mut effects = Vec::new();
    for prompt in game.messenger.prompts_for_trial(trial) {
        let tag = tag_for(prompt.player.as_str());
        effects.push(coordinator.submit(prompt.round, &prompt.player, &tag).await);
    }
    effects
}

/// Block until the running session reports completion.
pub async fn wait_finished(coordinator: &Arc<SessionCoordinator>) {
    let mut progress = coordinator.subscribe();
    progress
        .wait_for(|p| p.finished)
        .await
        .expect("progress channel should stay open");
}

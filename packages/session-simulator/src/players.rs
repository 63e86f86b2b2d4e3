//! Simulated players answering their prompts.

use std::sync::Arc;
use std::time::Duration;

use hashtag_backend::{RoundPrompt, SessionCoordinator};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;
use tracing::trace;

const VOCABULARY: [&str; 8] = [
    "sunset", "coffee", "monday", "ocean", "pizza", "mountains", "jazz", "rain",
];

#[derive(Debug, Clone, Copy)]
pub struct Behavior {
    /// Chance a player answers with the trial's shared tag.
    pub agree_rate: f64,
    /// Chance a player never answers.
    pub silence_rate: f64,
    /// Upper bound of the random reply delay.
    pub max_think: Duration,
}

/// Answer prompts until the queue closes.
pub async fn run(
    coordinator: Arc<SessionCoordinator>,
    mut prompts: mpsc::UnboundedReceiver<RoundPrompt>,
    behavior: Behavior,
    seed: u64,
) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    while let Some(prompt) = prompts.recv().await {
        if rng.random_bool(behavior.silence_rate) {
            trace!(round_id = %prompt.round, player = %prompt.player, "Player stays silent");
            continue;
        }
        let tag = if rng.random_bool(behavior.agree_rate) {
            shared_tag(prompt.trial)
        } else {
            random_tag(&mut rng)
        };
        let max_ms = behavior.max_think.as_millis() as u64;
        let delay = Duration::from_millis(rng.random_range(0..=max_ms));

        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            coordinator.submit(prompt.round, &prompt.player, &tag).await;
        });
    }
}

fn shared_tag(trial: u32) -> String {
    format!("#{}", VOCABULARY[trial as usize % VOCABULARY.len()])
}

/// A vocabulary word with random decoration the game normalizes away.
fn random_tag(rng: &mut ChaCha8Rng) -> String {
    let word = VOCABULARY[rng.random_range(0..VOCABULARY.len())];
    match rng.random_range(0..3) {
        0 => format!("#{word}"),
        1 => format!("  {} ", word.to_uppercase()),
        _ => word.to_string(),
    }
}

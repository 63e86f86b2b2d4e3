//! In-process stand-in for the messaging platform.

use async_trait::async_trait;
use hashtag_backend::domain::{ChannelId, PlayerId, RoundId};
use hashtag_backend::{AppError, Messenger, RoundPrompt, RoundResult, SessionEvent};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Default, Clone)]
pub struct DeliveryStats {
    pub prompts: usize,
    pub acknowledgements: usize,
    pub results: usize,
    pub announcements: Vec<String>,
}

/// One channel whose members are simulated players. Prompts are forwarded to
/// the player driver through an unbounded queue.
pub struct SimulatedChannel {
    channel: ChannelId,
    members: Vec<PlayerId>,
    prompts: mpsc::UnboundedSender<RoundPrompt>,
    stats: Mutex<DeliveryStats>,
}

impl SimulatedChannel {
    pub fn new(
        channel: ChannelId,
        members: Vec<PlayerId>,
    ) -> (Self, mpsc::UnboundedReceiver<RoundPrompt>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sim = Self {
            channel,
            members,
            prompts: tx,
            stats: Mutex::new(DeliveryStats::default()),
        };
        (sim, rx)
    }

    pub fn stats(&self) -> DeliveryStats {
        self.stats.lock().clone()
    }
}

#[async_trait]
impl Messenger for SimulatedChannel {
    async fn list_session_candidates(
        &self,
        channel: &ChannelId,
    ) -> Result<Vec<PlayerId>, AppError> {
        if *channel == self.channel {
            Ok(self.members.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn notify_round_opened(&self, prompt: &RoundPrompt) -> Result<(), AppError> {
        self.stats.lock().prompts += 1;
        self.prompts
            .send(prompt.clone())
            .map_err(|_| AppError::messaging("player driver stopped"))
    }

    async fn notify_submission_received(
        &self,
        round: RoundId,
        _channel: &ChannelId,
        player: &PlayerId,
    ) -> Result<(), AppError> {
        self.stats.lock().acknowledgements += 1;
        debug!(round_id = %round, %player, "Waiting for partner");
        Ok(())
    }

    async fn notify_round_result(&self, result: &RoundResult) -> Result<(), AppError> {
        self.stats.lock().results += 1;
        debug!(
            round_id = %result.round,
            player = %result.player,
            outcome = %result.outcome,
            total_points = result.total_points,
            "Round result delivered"
        );
        Ok(())
    }

    async fn broadcast_session_event(
        &self,
        channel: &ChannelId,
        event: &SessionEvent,
    ) -> Result<(), AppError> {
        info!(%channel, "{event}");
        self.stats.lock().announcements.push(event.to_string());
        Ok(())
    }
}

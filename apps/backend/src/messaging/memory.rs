//! In-process messenger that records every delivery.
//!
//! Used by the test suites and anywhere the game runs without a platform
//! transport. Channel membership is set explicitly.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use super::{Messenger, RoundPrompt, RoundResult, SessionEvent};
use crate::domain::{ChannelId, PlayerId, RoundId};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Prompt(RoundPrompt),
    Waiting {
        round: RoundId,
        player: PlayerId,
    },
    Result(RoundResult),
    Broadcast {
        channel: ChannelId,
        event: SessionEvent,
    },
}

#[derive(Debug, Default)]
pub struct RecordingMessenger {
    members: RwLock<HashMap<ChannelId, Vec<PlayerId>>>,
    log: Mutex<Vec<Delivery>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the member list of `channel`.
    pub fn set_members(&self, channel: &ChannelId, players: impl IntoIterator<Item = PlayerId>) {
        self.members
            .write()
            .insert(channel.clone(), players.into_iter().collect());
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.log.lock().clone()
    }

    pub fn prompts(&self) -> Vec<RoundPrompt> {
        self.log
            .lock()
            .iter()
            .filter_map(|d| match d {
                Delivery::Prompt(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn prompts_for_trial(&self, trial: u32) -> Vec<RoundPrompt> {
        self.prompts()
            .into_iter()
            .filter(|p| p.trial == trial)
            .collect()
    }

    pub fn results(&self) -> Vec<RoundResult> {
        self.log
            .lock()
            .iter()
            .filter_map(|d| match d {
                Delivery::Result(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn broadcasts(&self) -> Vec<SessionEvent> {
        self.log
            .lock()
            .iter()
            .filter_map(|d| match d {
                Delivery::Broadcast { event, .. } => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn list_session_candidates(
        &self,
        channel: &ChannelId,
    ) -> Result<Vec<PlayerId>, AppError> {
        Ok(self
            .members
            .read()
            .get(channel)
            .cloned()
            .unwrap_or_default())
    }

    async fn notify_round_opened(&self, prompt: &RoundPrompt) -> Result<(), AppError> {
        self.log.lock().push(Delivery::Prompt(prompt.clone()));
        Ok(())
    }

    async fn notify_submission_received(
        &self,
        round: RoundId,
        _channel: &ChannelId,
        player: &PlayerId,
    ) -> Result<(), AppError> {
        self.log.lock().push(Delivery::Waiting {
            round,
            player: player.clone(),
        });
        Ok(())
    }

    async fn notify_round_result(&self, result: &RoundResult) -> Result<(), AppError> {
        self.log.lock().push(Delivery::Result(result.clone()));
        Ok(())
    }

    async fn broadcast_session_event(
        &self,
        channel: &ChannelId,
        event: &SessionEvent,
    ) -> Result<(), AppError> {
        self.log.lock().push(Delivery::Broadcast {
            channel: channel.clone(),
            event: event.clone(),
        });
        Ok(())
    }
}

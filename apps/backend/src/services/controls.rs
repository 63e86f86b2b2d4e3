//! Channel control surface: mention commands and auto-start.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::GameConfig;
use crate::domain::ChannelId;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::messaging::{Messenger, SessionEvent};
use crate::services::session::{SessionCoordinator, SessionParams, SessionProgress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Start,
    Scores,
    Help,
}

impl ControlCommand {
    /// Case-insensitive substring match; `start` wins over `scores`.
    pub fn parse(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("start") {
            ControlCommand::Start
        } else if text.contains("scores") {
            ControlCommand::Scores
        } else {
            ControlCommand::Help
        }
    }
}

/// How a start request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartReport {
    Started(SessionProgress),
    Rejected,
    Failed(ErrorCode),
    /// Auto-start conditions not met.
    Skipped,
}

pub struct GameBot {
    config: GameConfig,
    coordinator: Arc<SessionCoordinator>,
    messenger: Arc<dyn Messenger>,
}

impl GameBot {
    pub fn new(
        config: GameConfig,
        coordinator: Arc<SessionCoordinator>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            config,
            coordinator,
            messenger,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &Arc<SessionCoordinator> {
        &self.coordinator
    }

    /// Handle a message addressed to the game in `channel`.
    pub async fn handle_mention(
        &self,
        channel: &ChannelId,
        text: &str,
    ) -> Result<Option<StartReport>, AppError> {
        match ControlCommand::parse(text) {
            ControlCommand::Start => self.start(channel).await.map(Some),
            ControlCommand::Scores => {
                self.announce_scores(channel).await?;
                Ok(None)
            }
            ControlCommand::Help => {
                self.messenger
                    .broadcast_session_event(channel, &SessionEvent::Help)
                    .await?;
                Ok(None)
            }
        }
    }

    /// React to a membership change in `channel`.
    pub async fn handle_member_joined(&self, channel: &ChannelId) -> Result<StartReport, AppError> {
        let Some(game_channel) = &self.config.game_channel else {
            return Ok(StartReport::Skipped);
        };
        if game_channel != channel {
            return Ok(StartReport::Skipped);
        }
        if self.coordinator.is_active() {
            return Ok(StartReport::Skipped);
        }
        let candidates = self.messenger.list_session_candidates(channel).await?;
        if candidates.len() < self.config.min_players {
            info!(
                %channel,
                candidates = candidates.len(),
                min_players = self.config.min_players,
                "Waiting for more players"
            );
            return Ok(StartReport::Skipped);
        }
        self.start(channel).await
    }

    async fn start(&self, channel: &ChannelId) -> Result<StartReport, AppError> {
        if self.coordinator.is_active() {
            self.reject(channel).await?;
            return Ok(StartReport::Rejected);
        }

        let players = self.messenger.list_session_candidates(channel).await?;
        let params = SessionParams::from_config(&self.config);
        match self
            .coordinator
            .start_session(channel.clone(), players, params)
            .await
        {
            Ok(progress) => Ok(StartReport::Started(progress)),
            Err(e) if e.code() == ErrorCode::SessionActive => {
                self.reject(channel).await?;
                Ok(StartReport::Rejected)
            }
            Err(e) if e.is_operator_fixable() => {
                warn!(%channel, code = %e.code(), error = %e, "Session start failed");
                self.messenger
                    .broadcast_session_event(
                        channel,
                        &SessionEvent::StartFailed {
                            reason: e.detail().to_string(),
                        },
                    )
                    .await?;
                Ok(StartReport::Failed(e.code()))
            }
            Err(e) => Err(e),
        }
    }

    async fn reject(&self, channel: &ChannelId) -> Result<(), AppError> {
        let current = self.coordinator.progress();
        self.messenger
            .broadcast_session_event(
                channel,
                &SessionEvent::StartRejected {
                    reason: format!(
                        "trial {} of {}",
                        current.current_trial, current.trial_count
                    ),
                },
            )
            .await
    }

    /// Broadcast standings, listing the current session's roster even
    /// before it scores. Channel members stand in when no session exists.
    async fn announce_scores(&self, channel: &ChannelId) -> Result<(), AppError> {
        let players = match self
            .coordinator
            .with_session(|s| s.players().to_vec())
            .await
        {
            Some(players) => players,
            None => self.messenger.list_session_candidates(channel).await?,
        };
        for player in &players {
            self.coordinator.ledger().ensure_tracked(player);
        }
        let standings = self.coordinator.standings();
        self.messenger
            .broadcast_session_event(channel, &SessionEvent::Leaderboard(standings))
            .await
    }
}

//! Boundary with the messaging platform.
//!
//! The platform transport (prompts, input forms, replies) lives outside this
//! crate. The game only needs the operations of [`Messenger`]; inbound
//! replies come back through `SessionCoordinator::submit`.

pub mod memory;

use std::fmt;

use async_trait::async_trait;

use crate::domain::{ChannelId, PlayerId, RoundId, RoundOutcome};
use crate::error::AppError;
use crate::services::ledger::Standing;

/// Private prompt telling a player who they are paired with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundPrompt {
    pub round: RoundId,
    pub channel: ChannelId,
    pub player: PlayerId,
    pub partner: PlayerId,
    pub trial: u32,
}

/// Private result message for one player of a closed round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    pub round: RoundId,
    pub channel: ChannelId,
    pub player: PlayerId,
    pub partner: PlayerId,
    pub trial: u32,
    pub own_tag: String,
    pub partner_tag: String,
    pub outcome: RoundOutcome,
    pub total_points: u32,
}

/// Public announcements in the session channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Started { players: usize, trials: u32 },
    TrialOpened { trial: u32 },
    Completed,
    StartRejected { reason: String },
    StartFailed { reason: String },
    Leaderboard(Vec<Standing>),
    Help,
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::Started { players, trials } => {
                write!(f, "Hashtag game starting with {players} players, {trials} trials.")
            }
            SessionEvent::TrialOpened { trial } => {
                write!(f, "Submit your hashtag for Trial {trial}.")
            }
            SessionEvent::Completed => {
                f.write_str("All trials complete. Ask for `scores` to see the leaderboard.")
            }
            SessionEvent::StartRejected { reason } => {
                write!(f, "A game is already in progress ({reason}).")
            }
            SessionEvent::StartFailed { reason } => write!(f, "Could not start the game: {reason}"),
            SessionEvent::Leaderboard(standings) => {
                f.write_str("Leaderboard")?;
                if standings.is_empty() {
                    return f.write_str("\nNo scores yet.");
                }
                for s in standings {
                    write!(f, "\n{}: {}", s.player, s.points)?;
                }
                Ok(())
            }
            SessionEvent::Help => f.write_str(
                "Try `start` to begin a game or `scores` to view the leaderboard. \
                 Results are saved after every round.",
            ),
        }
    }
}

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Players eligible for a session in `channel` (the bot itself excluded).
    async fn list_session_candidates(&self, channel: &ChannelId)
        -> Result<Vec<PlayerId>, AppError>;

    /// Send the private prompt whose reply later arrives as a submission
    /// keyed by `prompt.round`.
    async fn notify_round_opened(&self, prompt: &RoundPrompt) -> Result<(), AppError>;

    /// Acknowledge a submission while the partner has not answered yet.
    async fn notify_submission_received(
        &self,
        round: RoundId,
        channel: &ChannelId,
        player: &PlayerId,
    ) -> Result<(), AppError>;

    async fn notify_round_result(&self, result: &RoundResult) -> Result<(), AppError>;

    async fn broadcast_session_event(
        &self,
        channel: &ChannelId,
        event: &SessionEvent,
    ) -> Result<(), AppError>;
}

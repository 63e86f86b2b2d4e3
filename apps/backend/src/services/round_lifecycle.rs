//! Round lifecycle engine.
//!
//! Owns every `RoundRecord` of the running session, keyed by round id. Each
//! record sits behind its own lock; submissions and timeouts for one round
//! serialize on it, different rounds never contend. Whichever call closes a
//! round performs the close side effects (ledger credit, export row, result
//! notices) after releasing the lock; the loser sees `closed` and does
//! nothing.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::round::IgnoreReason;
use crate::domain::{
    ChannelId, PlayerId, RoundId, RoundOutcome, RoundRecord, SubmitEffect,
};
use crate::messaging::{Messenger, RoundPrompt, RoundResult};
use crate::repos::RecordSink;
use crate::services::ledger::ScoreLedger;

struct RoundSlot {
    record: Mutex<RoundRecord>,
    timer: CancellationToken,
}

/// A round that was closed by the call that returned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedRound {
    pub id: RoundId,
    pub trial: u32,
    pub outcome: RoundOutcome,
}

pub struct RoundEngine {
    rounds: DashMap<RoundId, Arc<RoundSlot>>,
    ledger: Arc<ScoreLedger>,
    messenger: Arc<dyn Messenger>,
    sink: Arc<dyn RecordSink>,
}

impl RoundEngine {
    pub fn new(
        ledger: Arc<ScoreLedger>,
        messenger: Arc<dyn Messenger>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            rounds: DashMap::new(),
            ledger,
            messenger,
            sink,
        }
    }

    /// Register a new open round and prompt both players.
    ///
    /// Returns the round's timer token; cancelling it tells the timeout task
    /// the round closed by submission.
    pub async fn open_round(
        &self,
        id: RoundId,
        trial: u32,
        channel: ChannelId,
        first: PlayerId,
        second: PlayerId,
    ) -> CancellationToken {
        let timer = CancellationToken::new();
        let record = RoundRecord::open(
            id,
            trial,
            channel.clone(),
            first.clone(),
            second.clone(),
            OffsetDateTime::now_utc(),
        );
        self.rounds.insert(
            id,
            Arc::new(RoundSlot {
                record: Mutex::new(record),
                timer: timer.clone(),
            }),
        );
        debug!(round_id = %id, trial, %first, %second, "Round opened");

        for (player, partner) in [(&first, &second), (&second, &first)] {
            let prompt = RoundPrompt {
                round: id,
                channel: channel.clone(),
                player: player.clone(),
                partner: partner.clone(),
                trial,
            };
            if let Err(e) = self.messenger.notify_round_opened(&prompt).await {
                // The round stays open; the timeout resolves it.
                warn!(round_id = %id, %player, error = %e, "Failed to deliver round prompt");
            }
        }

        timer
    }

    /// Apply a player's submission.
    ///
    /// Unknown rounds, closed rounds and outsiders are ignored. When the
    /// submission completes the pair, the round closes here.
    pub async fn submit(&self, id: RoundId, player: &PlayerId, raw_tag: &str) -> SubmitEffect {
        let Some(slot) = self.slot(id) else {
            debug!(round_id = %id, %player, "Submission for unknown round ignored");
            return SubmitEffect::Ignored(IgnoreReason::UnknownRound);
        };

        let (effect, closed_snapshot) = {
            let mut record = slot.record.lock();
            let effect = record.submit(player, raw_tag);
            let snapshot = matches!(effect, SubmitEffect::Closed(_)).then(|| record.clone());
            (effect, snapshot)
        };

        match effect {
            SubmitEffect::Ignored(reason) => {
                debug!(round_id = %id, %player, ?reason, "Submission ignored");
            }
            SubmitEffect::Recorded => {
                debug!(round_id = %id, %player, "Submission recorded, waiting for partner");
                let channel = slot.record.lock().channel().clone();
                if let Err(e) = self
                    .messenger
                    .notify_submission_received(id, &channel, player)
                    .await
                {
                    warn!(round_id = %id, %player, error = %e, "Failed to acknowledge submission");
                }
            }
            SubmitEffect::Closed(_) => {
                slot.timer.cancel();
                if let Some(record) = closed_snapshot {
                    self.finish_close(&record, true).await;
                }
            }
        }
        effect
    }

    /// Close the round as timed out unless it already closed.
    pub async fn expire(&self, id: RoundId) -> Option<ClosedRound> {
        let slot = self.slot(id)?;
        let snapshot = {
            let mut record = slot.record.lock();
            record.expire().then(|| record.clone())
        };
        let Some(record) = snapshot else {
            debug!(round_id = %id, "Timeout after close ignored");
            return None;
        };
        self.finish_close(&record, false).await;
        Some(ClosedRound {
            id,
            trial: record.trial(),
            outcome: RoundOutcome::Timeout,
        })
    }

    /// Side effects of a close, run once by the closing caller.
    async fn finish_close(&self, record: &RoundRecord, notify_players: bool) {
        let Some(outcome) = record.outcome() else {
            return;
        };
        let [a, b] = record.players();

        if outcome == RoundOutcome::Match {
            self.ledger.record_match(a, b);
        }

        if let Err(e) = self.sink.append(&record.export()) {
            warn!(round_id = %record.id(), error = %e, "Failed to export round");
        }

        info!(
            round_id = %record.id(),
            trial = record.trial(),
            outcome = %outcome,
            completed = record.is_completed(),
            "Round closed"
        );

        if !notify_players {
            return;
        }
        for (player, partner) in [(a, b), (b, a)] {
            let result = RoundResult {
                round: record.id(),
                channel: record.channel().clone(),
                player: player.clone(),
                partner: partner.clone(),
                trial: record.trial(),
                own_tag: record.tag_of(player).unwrap_or_default().to_string(),
                partner_tag: record.tag_of(partner).unwrap_or_default().to_string(),
                outcome,
                total_points: self.ledger.points(player),
            };
            if let Err(e) = self.messenger.notify_round_result(&result).await {
                warn!(round_id = %record.id(), %player, error = %e, "Failed to deliver round result");
            }
        }
    }

    fn slot(&self, id: RoundId) -> Option<Arc<RoundSlot>> {
        self.rounds.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Snapshot of one round.
    pub fn record(&self, id: RoundId) -> Option<RoundRecord> {
        self.slot(id).map(|slot| slot.record.lock().clone())
    }

    /// True when every listed round is closed. Unknown ids count as closed
    /// so a forgotten round can never hold a trial open.
    pub fn all_closed(&self, ids: &[RoundId]) -> bool {
        ids.iter()
            .all(|id| self.slot(*id).is_none_or(|slot| slot.record.lock().is_closed()))
    }

    pub fn any_open(&self) -> bool {
        self.rounds
            .iter()
            .any(|entry| !entry.value().record.lock().is_closed())
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Forget every round of the previous session, disarming its timers.
    pub fn reset(&self) {
        for entry in self.rounds.iter() {
            entry.value().timer.cancel();
        }
        self.rounds.clear();
    }
}

//! Per-pair round state machine.
//!
//! `Open -> PartiallySubmitted -> Closed(outcome)`. A round closes exactly
//! once: either the second player's submission completes it, or the timeout
//! expires it. Every later event is ignored. This type holds no lock; the
//! round engine serializes access to it.

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::ids::{ChannelId, PlayerId, RoundId};
use super::tags::{normalize_tag, tags_match};

/// Terminal result of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RoundOutcome {
    Match,
    NoMatch,
    Timeout,
}

impl RoundOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            RoundOutcome::Match => "match",
            RoundOutcome::NoMatch => "no match",
            RoundOutcome::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Open,
    PartiallySubmitted,
    Closed(RoundOutcome),
}

/// Why a submission changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    AlreadyClosed,
    NotInPair,
    /// The round identifier is not (or no longer) known.
    UnknownRound,
}

/// Result of applying one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitEffect {
    Ignored(IgnoreReason),
    /// Tag stored; partner has not submitted yet.
    Recorded,
    /// This submission completed the pair and closed the round.
    Closed(RoundOutcome),
}

#[derive(Debug, Clone)]
pub struct RoundRecord {
    id: RoundId,
    trial: u32,
    channel: ChannelId,
    players: [PlayerId; 2],
    tags: [Option<String>; 2],
    closed: bool,
    outcome: Option<RoundOutcome>,
    started_at: OffsetDateTime,
}

impl RoundRecord {
    pub fn open(
        id: RoundId,
        trial: u32,
        channel: ChannelId,
        first: PlayerId,
        second: PlayerId,
        started_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            trial,
            channel,
            players: [first, second],
            tags: [None, None],
            closed: false,
            outcome: None,
            started_at,
        }
    }

    pub fn id(&self) -> RoundId {
        self.id
    }

    pub fn trial(&self) -> u32 {
        self.trial
    }

    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    pub fn players(&self) -> &[PlayerId; 2] {
        &self.players
    }

    pub fn started_at(&self) -> OffsetDateTime {
        self.started_at
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        self.outcome
    }

    /// Both players have submitted (regardless of how the round closed).
    pub fn is_completed(&self) -> bool {
        self.tags.iter().all(Option::is_some)
    }

    pub fn phase(&self) -> RoundPhase {
        match (self.outcome, self.tags.iter().any(Option::is_some)) {
            (Some(outcome), _) => RoundPhase::Closed(outcome),
            (None, true) => RoundPhase::PartiallySubmitted,
            (None, false) => RoundPhase::Open,
        }
    }

    fn seat_of(&self, player: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p == player)
    }

    pub fn has_submitted(&self, player: &PlayerId) -> bool {
        self.seat_of(player)
            .is_some_and(|seat| self.tags[seat].is_some())
    }

    /// Normalized tag submitted by `player`, if any.
    pub fn tag_of(&self, player: &PlayerId) -> Option<&str> {
        self.seat_of(player)
            .and_then(|seat| self.tags[seat].as_deref())
    }

    /// The other player of the pair.
    pub fn partner_of(&self, player: &PlayerId) -> Option<&PlayerId> {
        self.seat_of(player).map(|seat| &self.players[1 - seat])
    }

    /// Record `player`'s tag. A repeated submission before close overwrites
    /// the earlier tag.
    pub fn submit(&mut self, player: &PlayerId, raw_tag: &str) -> SubmitEffect {
        if self.closed {
            return SubmitEffect::Ignored(IgnoreReason::AlreadyClosed);
        }
        let Some(seat) = self.seat_of(player) else {
            return SubmitEffect::Ignored(IgnoreReason::NotInPair);
        };

        self.tags[seat] = Some(normalize_tag(raw_tag));

        let outcome = match &self.tags {
            [Some(a), Some(b)] if tags_match(a, b) => RoundOutcome::Match,
            [Some(_), Some(_)] => RoundOutcome::NoMatch,
            _ => return SubmitEffect::Recorded,
        };
        self.close(outcome);
        SubmitEffect::Closed(outcome)
    }

    /// Close the round as timed out. Returns `false` when it was already
    /// closed, in which case nothing changes.
    pub fn expire(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.close(RoundOutcome::Timeout);
        true
    }

    fn close(&mut self, outcome: RoundOutcome) {
        self.closed = true;
        self.outcome = Some(outcome);
    }

    /// Flat export row for the record sink.
    pub fn export(&self) -> RoundExport {
        let [a, b] = &self.players;
        RoundExport {
            round_id: self.id.to_string(),
            trial: self.trial,
            player_a: a.to_string(),
            player_b: b.to_string(),
            player_a_hashtag: self.tags[0].clone().unwrap_or_default(),
            player_b_hashtag: self.tags[1].clone().unwrap_or_default(),
            completed: u8::from(self.is_completed()),
            started_at: self
                .started_at
                .format(&Rfc3339)
                .unwrap_or_else(|_| self.started_at.unix_timestamp().to_string()),
            game_outcome: self.outcome.map(RoundOutcome::as_str).unwrap_or_default(),
        }
    }
}

/// One exported round, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundExport {
    pub round_id: String,
    pub trial: u32,
    pub player_a: String,
    pub player_b: String,
    pub player_a_hashtag: String,
    pub player_b_hashtag: String,
    pub completed: u8,
    pub started_at: String,
    pub game_outcome: &'static str,
}

impl RoundExport {
    pub const HEADER: [&'static str; 9] = [
        "round_id",
        "trial",
        "player_a",
        "player_b",
        "player_a_hashtag",
        "player_b_hashtag",
        "completed",
        "started_at",
        "game_outcome",
    ];
}

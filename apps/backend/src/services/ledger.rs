//! Score ledger: accumulated points per player.
//!
//! Entries are created lazily so players who never score still show up on
//! the leaderboard. Points only ever grow.

use dashmap::DashMap;
use serde::Serialize;

use crate::domain::PlayerId;

/// One leaderboard line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub player: PlayerId,
    pub points: u32,
}

#[derive(Debug, Default)]
pub struct ScoreLedger {
    points: DashMap<PlayerId, u32>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit one point to both players of a matched round.
    pub fn record_match(&self, a: &PlayerId, b: &PlayerId) {
        for player in [a, b] {
            *self.points.entry(player.clone()).or_insert(0) += 1;
        }
    }

    /// Create a zero entry unless the player is already tracked.
    pub fn ensure_tracked(&self, player: &PlayerId) {
        self.points.entry(player.clone()).or_insert(0);
    }

    pub fn points(&self, player: &PlayerId) -> u32 {
        self.points.get(player).map_or(0, |entry| *entry.value())
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Every tracked player, sorted by points descending, then identifier.
    pub fn standings(&self) -> Vec<Standing> {
        let mut all: Vec<Standing> = self
            .points
            .iter()
            .map(|entry| Standing {
                player: entry.key().clone(),
                points: *entry.value(),
            })
            .collect();
        all.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.player.cmp(&b.player)));
        all
    }

    /// The first `n` standings.
    pub fn top(&self, n: usize) -> Vec<Standing> {
        let mut all = self.standings();
        all.truncate(n);
        all
    }
}

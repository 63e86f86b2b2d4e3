//! Trial plan: sampled edges grouped by trial number.

use std::collections::BTreeMap;

use super::ids::PlayerId;
use super::pairing::Edge;

/// One pair scheduled to play each other in a trial.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pairing {
    pub first: PlayerId,
    pub second: PlayerId,
}

/// Ordered mapping from trial number to that trial's pairings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrialSchedule {
    trials: BTreeMap<u32, Vec<Pairing>>,
}

impl TrialSchedule {
    /// Group edges by trial, keeping the input order inside each trial.
    pub fn from_edges(edges: impl IntoIterator<Item = Edge>) -> Self {
        let mut trials: BTreeMap<u32, Vec<Pairing>> = BTreeMap::new();
        for edge in edges {
            trials.entry(edge.trial).or_default().push(Pairing {
                first: edge.first,
                second: edge.second,
            });
        }
        Self { trials }
    }

    /// Pairings for `trial`; empty for trials outside the plan.
    pub fn pairings(&self, trial: u32) -> &[Pairing] {
        self.trials.get(&trial).map_or(&[], Vec::as_slice)
    }

    pub fn trial_count(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[Pairing])> {
        self.trials.iter().map(|(t, p)| (*t, p.as_slice()))
    }
}

//! Seeded spatial pairing sampler.
//!
//! For every trial the sampler draws a random perfect matching that only
//! uses neighborhood edges. A greedy walk over a randomly rotated visiting
//! order picks random free neighbors; when a player finds every neighbor
//! already taken the trial is thrown away and drawn again. All randomness
//! flows from one ChaCha stream, so a given `(seed, players, trials,
//! neighbor_size)` always produces the same schedule.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use super::ids::PlayerId;
use super::neighbors::{build_neighbor_graph, NeighborGraph};
use crate::errors::domain::{DomainError, InfraErrorKind, ValidationKind};

/// Default bound for resampling a single player's partner, and for
/// restarting a single trial after dead ends.
pub const DEFAULT_RESAMPLE_CAP: u32 = 1000;

/// Inputs of the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingParams {
    pub seed: u64,
    pub node_count: usize,
    pub trial_count: u32,
    pub neighbor_size: usize,
    pub resample_cap: u32,
}

impl PairingParams {
    pub fn new(seed: u64, node_count: usize, trial_count: u32, neighbor_size: usize) -> Self {
        Self {
            seed,
            node_count,
            trial_count,
            neighbor_size,
            resample_cap: DEFAULT_RESAMPLE_CAP,
        }
    }

    pub fn with_resample_cap(mut self, cap: u32) -> Self {
        self.resample_cap = cap;
        self
    }
}

/// A committed pairing of two ring positions in one trial (`low < high`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexedEdge {
    pub trial: u32,
    pub low: usize,
    pub high: usize,
}

impl IndexedEdge {
    fn normalized(a: usize, b: usize, trial: u32) -> Self {
        Self {
            trial,
            low: a.min(b),
            high: a.max(b),
        }
    }
}

/// A committed pairing of two players in one trial.
///
/// `first` is the player with the lower roster position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub first: PlayerId,
    pub second: PlayerId,
    pub trial: u32,
}

/// Sample every trial's matching over ring positions `0..node_count`.
///
/// The result is sorted by `(trial, low, high)`.
pub fn sample_pairings(params: PairingParams) -> Result<Vec<IndexedEdge>, DomainError> {
    validate(&params)?;
    let graph = build_neighbor_graph(params.node_count, params.neighbor_size)?;
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);

    let mut edges = Vec::with_capacity(params.trial_count as usize * params.node_count / 2);
    for trial in 1..=params.trial_count {
        let matching = sample_trial(&graph, trial, params.resample_cap, &mut rng)?;
        edges.extend(matching);
    }

    edges.sort_unstable();
    debug!(
        seed = params.seed,
        players = params.node_count,
        trials = params.trial_count,
        neighbor_size = params.neighbor_size,
        edges = edges.len(),
        "Pairing schedule sampled"
    );
    Ok(edges)
}

/// Sample the schedule and map ring positions onto the roster.
///
/// Roster order defines ring order: `players[i]` sits at position `i`.
pub fn build_pair_schedule(
    players: &[PlayerId],
    seed: u64,
    trial_count: u32,
    neighbor_size: usize,
    resample_cap: u32,
) -> Result<Vec<Edge>, DomainError> {
    let params = PairingParams::new(seed, players.len(), trial_count, neighbor_size)
        .with_resample_cap(resample_cap);
    let edges = sample_pairings(params)?;
    Ok(edges
        .into_iter()
        .map(|e| Edge {
            first: players[e.low].clone(),
            second: players[e.high].clone(),
            trial: e.trial,
        })
        .collect())
}

fn validate(params: &PairingParams) -> Result<(), DomainError> {
    if params.node_count < 2 || params.node_count % 2 != 0 {
        return Err(DomainError::validation(
            ValidationKind::InvalidPlayerCount,
            format!(
                "Player count {} must be even and at least 2",
                params.node_count
            ),
        ));
    }
    if params.trial_count == 0 {
        return Err(DomainError::validation(
            ValidationKind::InvalidTrialCount,
            "Trial count must be at least 1",
        ));
    }
    Ok(())
}

/// Draw one perfect matching for `trial`, restarting on dead ends.
fn sample_trial(
    graph: &NeighborGraph,
    trial: u32,
    cap: u32,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<IndexedEdge>, DomainError> {
    let n = graph.node_count();
    let mut matched = vec![false; n];
    let mut committed = Vec::with_capacity(n / 2);

    'attempt: for attempt in 1..=cap {
        matched.fill(false);
        committed.clear();

        let rotation = rng.random_range(0..n);
        let order = (0..n).map(|i| (i + n - rotation) % n);

        for node in order {
            if matched[node] {
                continue;
            }
            let neighbors = graph.neighbors(node);
            let mut draws = 0u32;
            loop {
                if neighbors.iter().all(|&other| matched[other]) {
                    trace!(trial, attempt, node, "Dead end, restarting trial");
                    continue 'attempt;
                }
                draws += 1;
                if draws > cap {
                    return Err(exhausted(trial, format!("player {node} exceeded {cap} draws")));
                }
                let partner = neighbors[rng.random_range(0..neighbors.len())];
                if !matched[partner] {
                    matched[node] = true;
                    matched[partner] = true;
                    committed.push(IndexedEdge::normalized(node, partner, trial));
                    break;
                }
            }
        }

        debug_assert!(matched.iter().all(|&m| m));
        trace!(trial, attempt, "Trial matched");
        return Ok(committed);
    }

    Err(exhausted(trial, format!("no perfect matching after {cap} attempts")))
}

fn exhausted(trial: u32, detail: String) -> DomainError {
    DomainError::infra(
        InfraErrorKind::SamplingExhausted,
        format!("Trial {trial}: {detail}; choose a different seed"),
    )
}

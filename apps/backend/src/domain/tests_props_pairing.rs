//! Property tests for the pairing sampler (pure domain).
//!
//! Contract:
//! - Same `(seed, n, trials, neighbor_size)` gives the same edge list
//! - Every trial is a perfect matching without repeated edges
//! - Every edge is normalized (`low < high`) and inside the neighborhood
//! - The complete graph (`neighbor_size = n - 1`) always succeeds

use std::collections::HashSet;

use proptest::prelude::*;

use crate::domain::neighbors::build_neighbor_graph;
use crate::domain::pairing::{sample_pairings, IndexedEdge, PairingParams};
use crate::domain::test_prelude;

/// Even player count, plus an even neighbor size in `2..n`.
fn ring_params() -> impl Strategy<Value = (usize, usize)> {
    (2usize..=20).prop_flat_map(|half_n| {
        let n = half_n * 2;
        let max_half_k = (n - 2) / 2;
        (Just(n), 1usize..=max_half_k.max(1)).prop_map(|(n, half_k)| (n, half_k * 2))
    })
}

fn assert_perfect_matchings(edges: &[IndexedEdge], n: usize, trials: u32) {
    for trial in 1..=trials {
        let in_trial: Vec<_> = edges.iter().filter(|e| e.trial == trial).collect();
        assert_eq!(in_trial.len(), n / 2, "trial {trial} edge count");
        let mut seen = HashSet::new();
        for e in in_trial {
            assert!(seen.insert(e.low), "player {} twice in trial {trial}", e.low);
            assert!(seen.insert(e.high), "player {} twice in trial {trial}", e.high);
        }
        assert_eq!(seen.len(), n);
    }
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    #[test]
    fn prop_sampler_is_deterministic(
        (n, k) in ring_params(),
        trials in 1u32..=6,
        seed in any::<u64>(),
    ) {
        let params = PairingParams::new(seed, n, trials, k);
        let first = sample_pairings(params);
        let second = sample_pairings(params);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_every_trial_is_perfect_matching(
        (n, k) in ring_params(),
        trials in 1u32..=6,
        seed in any::<u64>(),
    ) {
        let edges = sample_pairings(PairingParams::new(seed, n, trials, k)).unwrap();
        prop_assert_eq!(edges.len(), n / 2 * trials as usize);
        assert_perfect_matchings(&edges, n, trials);

        let graph = build_neighbor_graph(n, k).unwrap();
        for e in &edges {
            prop_assert!(e.low < e.high, "edge {:?} not normalized", e);
            prop_assert!(graph.neighbors(e.low).contains(&e.high), "edge {:?} outside neighborhood", e);
        }
    }

    #[test]
    fn prop_complete_graph_always_succeeds(
        half_n in 1usize..=15,
        trials in 1u32..=5,
        seed in any::<u64>(),
    ) {
        let n = half_n * 2;
        let edges = sample_pairings(PairingParams::new(seed, n, trials, n - 1));
        prop_assert!(edges.is_ok(), "complete graph failed: {:?}", edges);
        assert_perfect_matchings(&edges.unwrap(), n, trials);
    }
}

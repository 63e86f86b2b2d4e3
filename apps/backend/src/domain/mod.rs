//! Domain layer: pure pairing and round logic, no I/O and no locking.

pub mod ids;
pub mod neighbors;
pub mod pairing;
pub mod round;
pub mod schedule;
pub mod tags;

#[cfg(test)]
mod tests_props_pairing;

// Re-exports for ergonomics
pub use ids::{ChannelId, PlayerId, RoundId};
pub use neighbors::{build_neighbor_graph, NeighborGraph};
pub use pairing::{build_pair_schedule, sample_pairings, Edge, IndexedEdge, PairingParams};
pub use round::{RoundExport, RoundOutcome, RoundPhase, RoundRecord, SubmitEffect};
pub use schedule::{Pairing, TrialSchedule};
pub use tags::normalize_tag;

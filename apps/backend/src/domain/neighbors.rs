//! Fixed local neighborhoods on a circular player ordering.
//!
//! Players sit on a ring in roster order. Each player may only be paired with
//! the players inside a symmetric window around its own position.

use crate::errors::domain::{DomainError, ValidationKind};

/// Candidate partners for every position on the ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborGraph {
    neighbors: Vec<Vec<usize>>,
}

impl NeighborGraph {
    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Neighbors of `node`, ordered by ring position from `node - k/2` to
    /// `node + k/2` (the node itself excluded).
    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.neighbors[node]
    }

    /// Effective neighborhood size (identical for every node).
    pub fn degree(&self) -> usize {
        self.neighbors.first().map_or(0, Vec::len)
    }
}

/// Build the neighbor graph for `node_count` players with `neighbor_size`
/// neighbors each.
///
/// An odd `neighbor_size` is rounded to an even window (half-width rounded
/// half to even). `neighbor_size == node_count - 1` yields the complete
/// graph.
pub fn build_neighbor_graph(
    node_count: usize,
    neighbor_size: usize,
) -> Result<NeighborGraph, DomainError> {
    if neighbor_size == 0 {
        return Err(DomainError::validation(
            ValidationKind::InvalidNeighborSize,
            "Neighbor size must be positive",
        ));
    }
    if neighbor_size >= node_count {
        return Err(DomainError::validation(
            ValidationKind::InvalidNeighborSize,
            format!(
                "Neighbor size {neighbor_size} must be smaller than player count {node_count}"
            ),
        ));
    }

    if neighbor_size == node_count - 1 {
        let neighbors = (0..node_count)
            .map(|node| (0..node_count).filter(|&other| other != node).collect())
            .collect();
        return Ok(NeighborGraph { neighbors });
    }

    let half = half_window(neighbor_size);
    if half == 0 {
        return Err(DomainError::validation(
            ValidationKind::InvalidNeighborSize,
            format!("Neighbor size {neighbor_size} rounds to an empty neighborhood"),
        ));
    }

    // 2 * half <= neighbor_size + 1 < node_count, so the window never wraps
    // onto itself and holds no duplicates.
    let neighbors = (0..node_count)
        .map(|node| {
            (1..=half)
                .rev()
                .map(|offset| (node + node_count - offset) % node_count)
                .chain((1..=half).map(|offset| (node + offset) % node_count))
                .collect()
        })
        .collect();

    Ok(NeighborGraph { neighbors })
}

/// Half-width of the window: `neighbor_size / 2`, rounded half to even.
fn half_window(neighbor_size: usize) -> usize {
    let floor = neighbor_size / 2;
    if neighbor_size % 2 == 0 || floor % 2 == 0 {
        floor
    } else {
        floor + 1
    }
}

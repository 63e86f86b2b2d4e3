//! Helpers for generating unique test identifiers
//!
//! Player and channel identifiers are opaque strings in the game, so tests
//! build them from ULIDs to stay isolated from each other.

use ulid::Ulid;

/// Generate a unique string with the given prefix
///
/// # Examples
/// ```
/// use hashtag_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("player");
/// let id2 = unique_str("player");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("player-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate `count` player identifiers that sort in creation order.
///
/// The identifiers share one ULID stem and carry a zero-padded ordinal, so
/// lexicographic order matches the returned order. Leaderboard tie-breaks
/// depend on identifier order, which keeps expectations easy to write.
///
/// # Examples
/// ```
/// use hashtag_test_support::unique_helpers::unique_player_ids;
///
/// let ids = unique_player_ids(12);
/// assert_eq!(ids.len(), 12);
/// let mut sorted = ids.clone();
/// sorted.sort();
/// assert_eq!(ids, sorted);
/// ```
pub fn unique_player_ids(count: usize) -> Vec<String> {
    let stem = Ulid::new();
    (0..count).map(|i| format!("U{stem}-{i:04}")).collect()
}

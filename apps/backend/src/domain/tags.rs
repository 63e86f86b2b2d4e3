//! Tag normalization used for match comparison.

/// Marker players may type in front of a tag.
pub const TAG_MARKER: char = '#';

/// Trim whitespace, drop one leading marker (and the whitespace after it),
/// then lowercase. Returns an empty string for blank submissions.
pub fn normalize_tag(raw: &str) -> String {
    let trimmed = raw.trim();
    let unmarked = trimmed
        .strip_prefix(TAG_MARKER)
        .map_or(trimmed, str::trim_start);
    unmarked.to_lowercase()
}

/// Both tags present and identical after normalization.
pub fn tags_match(a: &str, b: &str) -> bool {
    !a.is_empty() && a == b
}

//! Pipe-delimited feature lists.
//!
//! The spreadsheet stores a product's feature bullets in a single cell,
//! separated by `|`. Splitting trims every entry and drops empty ones, so
//! `join_features(&split_features(s))` re-splits to the same list.

/// Delimiter between feature entries in a single cell.
pub const FEATURE_DELIMITER: char = '|';

/// Split a delimited cell into its trimmed, non-empty entries.
#[must_use]
pub fn split_features(raw: &str) -> Vec<String> {
    raw.split(FEATURE_DELIMITER)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Join entries back into a single delimited cell.
#[must_use]
pub fn join_features(features: &[String]) -> String {
    features.join(&FEATURE_DELIMITER.to_string())
}

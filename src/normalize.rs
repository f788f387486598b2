//! Name normalization shared by the track comparators.

use std::collections::HashSet;

/// Lowercase, drop everything that is not a word character or whitespace,
/// collapse whitespace runs and trim.
///
/// Word characters are ASCII letters, digits and `_`, so accented letters
/// and non-Latin scripts are stripped along with punctuation.
pub fn normalize_string(s: &str) -> String {
    let lowered = s.to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized artist names as an unordered set.
pub fn normalize_artist_set<S: AsRef<str>>(names: &[S]) -> HashSet<String> {
    names
        .iter()
        .map(|name| normalize_string(name.as_ref()))
        .collect()
}

use std::collections::BTreeSet;

/// Significant tokens of a fuzzy key, for candidate indexing only.
///
/// Drops single-character and purely numeric tokens.
pub fn tokenize(fuzzy_key: &str) -> BTreeSet<String> {
    fuzzy_key
        .split_whitespace()
        .filter(|t| t.chars().count() > 1 && !t.chars().all(|c| c.is_numeric()))
        .map(|t| t.to_string())
        .collect()
}

//! Bounded similarity between two names.
//!
//! `score = round(100 * (0.6 * sequence_ratio + 0.4 * jaccard))` over fuzzy keys.

use std::collections::{BTreeSet, HashMap};

use crate::normalize::to_fuzzy_key;

const SEQUENCE_WEIGHT: f64 = 0.6;
const JACCARD_WEIGHT: f64 = 0.4;

/// Score two raw names in `0..=100`.
pub fn score(name_a: &str, name_b: &str) -> u8 {
    score_keys(&to_fuzzy_key(name_a), &to_fuzzy_key(name_b))
}

/// Score two already-normalized fuzzy keys in `0..=100`. Empty keys score 0.
pub fn score_keys(fuzzy_a: &str, fuzzy_b: &str) -> u8 {
    if fuzzy_a.is_empty() || fuzzy_b.is_empty() {
        return 0;
    }
    let combined = SEQUENCE_WEIGHT * sequence_ratio(fuzzy_a, fuzzy_b)
        + JACCARD_WEIGHT * jaccard(fuzzy_a, fuzzy_b);
    (100.0 * combined).round().clamp(0.0, 100.0) as u8
}

/// Token-set Jaccard overlap over whitespace-split tokens. 0 when either side is empty.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let left: BTreeSet<&str> = a.split_whitespace().collect();
    let right: BTreeSet<&str> = b.split_whitespace().collect();
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let intersection = left.intersection(&right).count();
    let union = left.union(&right).count();
    intersection as f64 / union as f64
}

/// Longest-matching-block similarity ratio `2 * M / (len(a) + len(b))`.
///
/// `M` is the total size of the matching blocks found by recursively taking
/// the longest common substring and recursing on both sides of it. Among
/// equally long blocks the one starting earliest in `a`, then in `b`, wins.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let mut b_positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b_positions.entry(*c).or_default().push(j);
    }

    let mut matched = 0usize;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, size) = longest_match(&a, &b_positions, a_lo, a_hi, b_lo, b_hi);
        if size == 0 {
            continue;
        }
        matched += size;
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            pending.push((i + size, a_hi, j + size, b_hi));
        }
    }

    2.0 * matched as f64 / total as f64
}

/// Longest common block of `a[a_lo..a_hi]` and `b[b_lo..b_hi]` as `(i, j, size)`.
fn longest_match(
    a: &[char],
    b_positions: &HashMap<char, Vec<usize>>,
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (a_lo, b_lo, 0);
    // run length of the match ending at b[j], for the previous row of `a`
    let mut prev: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(a_hi).skip(a_lo) {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b_positions.get(c) {
            for &j in positions {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }
                let run = j.checked_sub(1).and_then(|p| prev.get(&p)).copied().unwrap_or(0) + 1;
                next.insert(j, run);
                if run > best_size {
                    best_i = i + 1 - run;
                    best_j = j + 1 - run;
                    best_size = run;
                }
            }
        }
        prev = next;
    }

    (best_i, best_j, best_size)
}

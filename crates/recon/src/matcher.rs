//! Matching passes.
//!
//! Each fuzzy pass consumes the still-unmatched keys of both sides and
//! commits pairs into the shared [`PassState`]. Left keys are visited in
//! ascending order and candidates are scored in ascending order; the first
//! candidate reaching the best score wins ties, so output is reproducible.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::ReconConfig;
use crate::index::CandidateIndex;
use crate::model::{MatchMethod, MatchResult};
use crate::normalize::{extract_codename, to_fuzzy_key};
use crate::score::score_keys;
use crate::side::{KeyedName, KeyedSide};

/// Fuzzy passes in the order they run.
pub const FUZZY_PASSES: [MatchMethod; 3] = [
    MatchMethod::Codename,
    MatchMethod::TokenFuzzy,
    MatchMethod::AuxiliaryXref,
];

/// Read-only inputs shared by every pass.
pub struct PassContext<'a> {
    pub left: &'a KeyedSide,
    pub right: &'a KeyedSide,
    pub threshold: i64,
    pub auxiliary_threshold: i64,
    pub auxiliary_columns: &'a [String],
    pub left_carry: &'a [String],
    pub right_carry: &'a [String],
}

impl<'a> PassContext<'a> {
    pub fn new(config: &'a ReconConfig, left: &'a KeyedSide, right: &'a KeyedSide) -> Self {
        Self {
            left,
            right,
            threshold: config.threshold,
            auxiliary_threshold: config.auxiliary_threshold(),
            auxiliary_columns: &config.auxiliary.columns,
            left_carry: &config.left.carry_columns,
            right_carry: &config.right.carry_columns,
        }
    }
}

/// Unmatched remainder of both sides plus the pairs committed so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassState {
    pub unmatched_left: BTreeSet<String>,
    pub unmatched_right: BTreeSet<String>,
    pub matches: Vec<MatchResult>,
}

impl PassState {
    fn commit(
        &mut self,
        ctx: &PassContext<'_>,
        left: &KeyedName,
        right: &KeyedName,
        score: u8,
        method: MatchMethod,
    ) {
        self.unmatched_left.remove(&left.exact_key);
        self.unmatched_right.remove(&right.exact_key);

        let mut aux_fields = BTreeMap::new();
        for (record, columns) in [(&left.record, ctx.left_carry), (&right.record, ctx.right_carry)] {
            for column in columns {
                if let Some(value) = record.field(column) {
                    aux_fields.entry(column.clone()).or_insert_with(|| value.to_string());
                }
            }
        }

        log::debug!(
            "{method}: '{}' <-> '{}' (score {score})",
            left.exact_key,
            right.exact_key
        );

        self.matches.push(MatchResult {
            left_key: left.exact_key.clone(),
            right_key: right.exact_key.clone(),
            left_name: left.display.clone(),
            right_name: right.display.clone(),
            left_fuzzy: left.fuzzy_key.clone(),
            right_fuzzy: right.fuzzy_key.clone(),
            score,
            method,
            aux_fields,
        });
    }
}

/// Exact pass: intersection of exact keys. Returns `(both, remainder)`.
pub fn match_exact(left: &KeyedSide, right: &KeyedSide) -> (Vec<String>, PassState) {
    let mut both = Vec::new();
    let mut state = PassState::default();

    for key in left.keys() {
        if right.get(key).is_some() {
            both.push(key.clone());
        } else {
            state.unmatched_left.insert(key.clone());
        }
    }
    for key in right.keys() {
        if left.get(key).is_none() {
            state.unmatched_right.insert(key.clone());
        }
    }

    (both, state)
}

/// Run one fuzzy pass by method. Returns the number of pairs committed.
pub fn apply_pass(method: MatchMethod, ctx: &PassContext<'_>, state: &mut PassState) -> usize {
    match method {
        MatchMethod::Exact => 0,
        MatchMethod::Codename => match_codename(ctx, state),
        MatchMethod::TokenFuzzy => match_token_fuzzy(ctx, state),
        MatchMethod::AuxiliaryXref => match_auxiliary_xref(ctx, state),
    }
}

/// Codename pass: pair keys sharing an extracted codename.
pub fn match_codename(ctx: &PassContext<'_>, state: &mut PassState) -> usize {
    let groups = group_by_codename(ctx.right, &state.unmatched_right);
    if groups.is_empty() {
        return 0;
    }

    let mut committed = 0;
    let left_keys: Vec<String> = state.unmatched_left.iter().cloned().collect();

    for left_key in &left_keys {
        let Some(left) = ctx.left.get(left_key) else {
            continue;
        };
        let Some(codename) = left.codename.as_deref() else {
            continue;
        };
        let Some(group) = groups.get(codename) else {
            continue;
        };

        let candidates = group
            .iter()
            .filter(|k| state.unmatched_right.contains(*k))
            .filter_map(|k| ctx.right.get(k));
        let best = best_candidate(candidates, |right| score_keys(&left.fuzzy_key, &right.fuzzy_key));

        if let Some((right, score)) = best {
            if i64::from(score) >= ctx.threshold {
                state.commit(ctx, left, right, score, MatchMethod::Codename);
                committed += 1;
            }
        }
    }

    committed
}

/// Token pass: score every right key sharing a significant token.
///
/// A candidate whose project-marked codename differs from the left key's
/// project-marked codename is excluded even when tokens overlap.
pub fn match_token_fuzzy(ctx: &PassContext<'_>, state: &mut PassState) -> usize {
    let mut index = CandidateIndex::build(
        state
            .unmatched_right
            .iter()
            .filter_map(|k| ctx.right.get(k))
            .map(|right| (right.exact_key.as_str(), right.tokens())),
    );
    if index.is_empty() {
        return 0;
    }

    let mut committed = 0;
    let left_keys: Vec<String> = state.unmatched_left.iter().cloned().collect();

    for left_key in &left_keys {
        let Some(left) = ctx.left.get(left_key) else {
            continue;
        };
        let hits = index.lookup(&left.tokens());
        if hits.is_empty() {
            continue;
        }

        let candidates = hits
            .iter()
            .filter_map(|k| ctx.right.get(k))
            .filter(|right| !codenames_conflict(left, right));
        let best = best_candidate(candidates, |right| score_keys(&left.fuzzy_key, &right.fuzzy_key));

        if let Some((right, score)) = best {
            if i64::from(score) >= ctx.threshold {
                state.commit(ctx, left, right, score, MatchMethod::TokenFuzzy);
                index.remove(&right.exact_key);
                committed += 1;
            }
        }
    }

    committed
}

/// Auxiliary cross-reference pass.
///
/// For left keys whose name has no codename, look for one in the configured
/// auxiliary columns of the left record. Each right key with that codename
/// is scored twice, plainly and with the codename prefixed to the left fuzzy
/// key, keeping the higher score. Uses the lowered auxiliary bar.
pub fn match_auxiliary_xref(ctx: &PassContext<'_>, state: &mut PassState) -> usize {
    if ctx.auxiliary_columns.is_empty() {
        return 0;
    }
    let groups = group_by_codename(ctx.right, &state.unmatched_right);
    if groups.is_empty() {
        return 0;
    }

    let mut committed = 0;
    let left_keys: Vec<String> = state.unmatched_left.iter().cloned().collect();

    for left_key in &left_keys {
        let Some(left) = ctx.left.get(left_key) else {
            continue;
        };
        if left.codename.is_some() {
            continue;
        }
        let Some(codename) = auxiliary_codename(left, ctx.auxiliary_columns) else {
            continue;
        };
        let Some(group) = groups.get(&codename) else {
            continue;
        };

        let synthetic = to_fuzzy_key(&format!("{codename} {}", left.fuzzy_key));
        let candidates = group
            .iter()
            .filter(|k| state.unmatched_right.contains(*k))
            .filter_map(|k| ctx.right.get(k));
        let best = best_candidate(candidates, |right| {
            let direct = score_keys(&left.fuzzy_key, &right.fuzzy_key);
            let prefixed = score_keys(&synthetic, &right.fuzzy_key);
            direct.max(prefixed)
        });

        if let Some((right, score)) = best {
            if i64::from(score) >= ctx.auxiliary_threshold {
                state.commit(ctx, left, right, score, MatchMethod::AuxiliaryXref);
                committed += 1;
            }
        }
    }

    committed
}

/// First codename found in the record's auxiliary columns, in column order.
fn auxiliary_codename(left: &KeyedName, columns: &[String]) -> Option<String> {
    columns
        .iter()
        .filter_map(|c| left.record.field(c))
        .find_map(extract_codename)
}

/// Both names carry an explicit project marker and the codenames differ.
/// A document-type codename ("mutual nda") is too weak to veto a pair.
fn codenames_conflict(left: &KeyedName, right: &KeyedName) -> bool {
    if !left.has_marked_codename() || !right.has_marked_codename() {
        return false;
    }
    matches!((&left.codename, &right.codename), (Some(l), Some(r)) if l != r)
}

/// Codename -> unmatched keys carrying it, both in ascending order.
fn group_by_codename(side: &KeyedSide, unmatched: &BTreeSet<String>) -> BTreeMap<String, BTreeSet<String>> {
    let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for key in unmatched {
        if let Some(codename) = side.get(key).and_then(|n| n.codename.clone()) {
            groups.entry(codename).or_default().insert(key.clone());
        }
    }
    groups
}

/// Highest-scoring candidate. Strict comparison keeps the first one seen on ties.
fn best_candidate<'a, I, F>(candidates: I, mut score_fn: F) -> Option<(&'a KeyedName, u8)>
where
    I: Iterator<Item = &'a KeyedName>,
    F: FnMut(&KeyedName) -> u8,
{
    let mut best: Option<(&KeyedName, u8)> = None;
    for candidate in candidates {
        let score = score_fn(candidate);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best
}

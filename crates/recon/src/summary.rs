use std::collections::BTreeMap;

use crate::model::{MatchMethod, Partition, ReconInput, ReconSummary};
use crate::side::KeyedSide;

/// Counts per partition set and per match method.
///
/// Totals are distinct exact keys, not raw records; records folded into an
/// earlier key are counted as duplicates. Every method appears in
/// `method_counts`, zero or not; `exact` counts the both-exact keys.
pub fn compute_summary(
    partition: &Partition,
    left: &KeyedSide,
    right: &KeyedSide,
    input: &ReconInput,
) -> ReconSummary {
    let mut method_counts: BTreeMap<String, usize> = [
        MatchMethod::Exact,
        MatchMethod::Codename,
        MatchMethod::TokenFuzzy,
        MatchMethod::AuxiliaryXref,
    ]
    .iter()
    .map(|m| (m.as_str().to_string(), 0))
    .collect();

    method_counts.insert(MatchMethod::Exact.as_str().to_string(), partition.both_exact.len());
    for m in &partition.fuzzy_matched {
        *method_counts.entry(m.method.as_str().to_string()).or_insert(0) += 1;
    }

    ReconSummary {
        total_left: left.len(),
        total_right: right.len(),
        both_exact: partition.both_exact.len(),
        fuzzy_matched: partition.fuzzy_matched.len(),
        only_left: partition.only_left.len(),
        only_right: partition.only_right.len(),
        dropped_left: input.left.dropped,
        dropped_right: input.right.dropped,
        duplicates_left: left.duplicate_records(),
        duplicates_right: right.duplicate_records(),
        method_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MatchResult;

    fn fuzzy(left: &str, right: &str, method: MatchMethod) -> MatchResult {
        MatchResult {
            left_key: left.into(),
            right_key: right.into(),
            left_name: left.into(),
            right_name: right.into(),
            left_fuzzy: left.into(),
            right_fuzzy: right.into(),
            score: 90,
            method,
            aux_fields: BTreeMap::new(),
        }
    }

    #[test]
    fn counts_every_method() {
        let partition = Partition {
            both_exact: vec!["a".into(), "b".into()],
            fuzzy_matched: vec![
                fuzzy("c", "c2", MatchMethod::Codename),
                fuzzy("d", "d2", MatchMethod::Codename),
                fuzzy("e", "e2", MatchMethod::AuxiliaryXref),
            ],
            only_left: vec!["f".into()],
            only_right: vec![],
        };
        let mut input = ReconInput::default();
        input.left.dropped = 3;

        let summary = compute_summary(&partition, &KeyedSide::default(), &KeyedSide::default(), &input);

        assert_eq!(summary.both_exact, 2);
        assert_eq!(summary.fuzzy_matched, 3);
        assert_eq!(summary.only_left, 1);
        assert_eq!(summary.only_right, 0);
        assert_eq!(summary.dropped_left, 3);
        assert_eq!(summary.duplicates_left, 0);
        assert_eq!(summary.method_counts["exact"], 2);
        assert_eq!(summary.method_counts["codename"], 2);
        assert_eq!(summary.method_counts["token_fuzzy"], 0);
        assert_eq!(summary.method_counts["auxiliary_xref"], 1);
    }
}

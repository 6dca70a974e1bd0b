use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::matcher::{apply_pass, match_exact, PassContext, FUZZY_PASSES};
use crate::model::{MatchMethod, Partition, ReconInput, ReconMeta, ReconResult};
use crate::side::KeyedSide;
use crate::summary::compute_summary;

/// Run reconciliation per config. Returns the partition + summary.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    let never = AtomicBool::new(false);
    run_with_cancel(config, input, &never)
}

/// Like [`run`], but checks `cancel` between passes.
pub fn run_with_cancel(
    config: &ReconConfig,
    input: &ReconInput,
    cancel: &AtomicBool,
) -> Result<ReconResult, ReconError> {
    config.validate()?;

    let left = KeyedSide::build(&input.left, config.case_sensitive);
    let right = KeyedSide::build(&input.right, config.case_sensitive);
    log::info!(
        "keyed {} left names ({} records), {} right names ({} records)",
        left.len(),
        input.left.records.len(),
        right.len(),
        input.right.records.len(),
    );

    let partition = reconcile(config, &left, &right, cancel)?;
    let summary = compute_summary(&partition, &left, &right, input);

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            left_label: config.left.label.clone(),
            right_label: config.right.label.clone(),
            threshold: config.threshold,
            auxiliary_threshold: config.auxiliary_threshold(),
            fuzzy: config.fuzzy,
            case_sensitive: config.case_sensitive,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        partition,
        left,
        right,
    })
}

/// Exact pass, then (if enabled) each fuzzy pass on the remainder of the last.
pub fn reconcile(
    config: &ReconConfig,
    left: &KeyedSide,
    right: &KeyedSide,
    cancel: &AtomicBool,
) -> Result<Partition, ReconError> {
    let (both_exact, mut state) = match_exact(left, right);
    log::info!(
        "exact pass: {} in both, {} left / {} right remaining",
        both_exact.len(),
        state.unmatched_left.len(),
        state.unmatched_right.len(),
    );

    if config.fuzzy {
        let ctx = PassContext::new(config, left, right);
        let mut last = MatchMethod::Exact;

        for method in FUZZY_PASSES {
            if cancel.load(Ordering::Relaxed) {
                return Err(ReconError::Cancelled {
                    after_pass: last.to_string(),
                });
            }
            let committed = apply_pass(method, &ctx, &mut state);
            log::info!(
                "{method} pass: {committed} matched, {} left / {} right remaining",
                state.unmatched_left.len(),
                state.unmatched_right.len(),
            );
            last = method;
        }
    }

    Ok(Partition {
        both_exact,
        fuzzy_matched: state.matches,
        only_left: state.unmatched_left.into_iter().collect(),
        only_right: state.unmatched_right.into_iter().collect(),
    })
}

//! Ordering of matched programs with the reference program pinned first.

use crate::enrichment::AnnotatedProgram;
use crate::models::{Metric, SortBy};
use std::cmp::Ordering;

/// Share of the widest range used to pad zero-width ranges.
const PADDING_RATIO: f64 = 0.03;
const MIN_PADDING: f64 = 1.0;

/// Stretches zero-width ranges so single-student cohorts stay visible.
pub fn pad_degenerate_ranges(programs: Vec<AnnotatedProgram<'_>>) -> Vec<AnnotatedProgram<'_>> {
    let max_spread = programs
        .iter()
        .map(AnnotatedProgram::spread)
        .fold(0.0_f64, f64::max);
    let padding = (PADDING_RATIO * max_spread).max(MIN_PADDING);

    programs
        .into_iter()
        .map(|mut program| {
            if program.spread() == 0.0 {
                program.max = program.min + padding;
                program.range_padded = true;
            }
            program
        })
        .collect()
}

/// Orders worst admissions first for `max`/`min`: high ranks, low scores.
fn worst_first(metric: Metric, a: f64, b: f64) -> Ordering {
    match metric {
        Metric::Rank => b.total_cmp(&a),
        Metric::Score => a.total_cmp(&b),
    }
}

fn compare(sort_by: SortBy, metric: Metric, a: &AnnotatedProgram<'_>, b: &AnnotatedProgram<'_>) -> Ordering {
    match sort_by {
        SortBy::Spread => b.spread().total_cmp(&a.spread()),
        SortBy::Price => b.price.total_cmp(&a.price),
        SortBy::Fulfillment => a.fulfillment_rate.total_cmp(&b.fulfillment_rate),
        SortBy::Max => worst_first(metric, a.max, b.max),
        SortBy::Min => worst_first(metric, a.min, b.min),
    }
}

/// Pads degenerate ranges, then sorts by `sort_by`.
///
/// The program keyed `reference_key` always comes first. The sort is stable,
/// so ties keep the order programs were scanned in.
pub fn rank<'a>(
    programs: Vec<AnnotatedProgram<'a>>,
    reference_key: &str,
    sort_by: SortBy,
    metric: Metric,
) -> Vec<AnnotatedProgram<'a>> {
    let mut programs = pad_degenerate_ranges(programs);

    let reference = programs
        .iter()
        .position(|p| p.key() == reference_key)
        .map(|index| programs.remove(index));

    programs.sort_by(|a, b| compare(sort_by, metric, a, b));

    if let Some(reference) = reference {
        programs.insert(0, reference);
    }
    programs
}

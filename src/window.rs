//! Comparison window around a reference program.

use crate::models::{Bound, Buffer, BufferDirection, Metric, ProgramRecord, Year};
use serde::Serialize;

/// Admissible `[min, max]` range for one metric. `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComparisonWindow {
    pub metric: Metric,
    pub min: f64,
    pub max: f64,
    pub is_user_overridden: bool,
}

impl ComparisonWindow {
    /// True when `[lower, upper]` lies entirely inside the window.
    pub fn contains(&self, lower: f64, upper: f64) -> bool {
        lower >= self.min && upper <= self.max
    }

    pub fn bound(&self, bound: Bound) -> f64 {
        match bound {
            Bound::Lower => self.min,
            Bound::Upper => self.max,
        }
    }

    /// The end of the window holding the strongest admissions.
    pub fn best(&self) -> f64 {
        self.bound(self.metric.best_bound())
    }

    pub fn worst(&self) -> f64 {
        self.bound(self.metric.worst_bound())
    }
}

/// User-supplied replacements for the reference program's bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowOverrides {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl WindowOverrides {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Which bound a buffer moves. Moving toward better admissions stretches the
/// best end of the window, moving toward worse stretches the worst end.
pub fn buffered_bound(metric: Metric, direction: BufferDirection) -> Bound {
    match direction {
        BufferDirection::TowardBetter => metric.best_bound(),
        BufferDirection::TowardWorse => metric.worst_bound(),
    }
}

/// Resolves the window for `reference` in `year`.
///
/// Returns `None` when either bound is missing after overrides are applied.
pub fn resolve_window(
    reference: &ProgramRecord,
    year: Year,
    metric: Metric,
    overrides: WindowOverrides,
    buffer: Option<Buffer>,
) -> Option<ComparisonWindow> {
    let mut min = overrides
        .min
        .or_else(|| reference.bound(metric, Bound::Lower, year))?;
    let mut max = overrides
        .max
        .or_else(|| reference.bound(metric, Bound::Upper, year))?;

    let mut is_user_overridden = !overrides.is_empty();

    if let Some(buffer) = buffer.filter(|b| b.step.is_finite() && b.step != 0.0) {
        match buffered_bound(metric, buffer.direction) {
            Bound::Lower => min = (min - buffer.step).max(0.0),
            Bound::Upper => max += buffer.step,
        }
        is_user_overridden = true;
    }

    if min > max {
        tracing::debug!(min, max, "window bounds inverted, swapping");
        std::mem::swap(&mut min, &mut max);
    }

    Some(ComparisonWindow {
        metric,
        min,
        max,
        is_user_overridden,
    })
}

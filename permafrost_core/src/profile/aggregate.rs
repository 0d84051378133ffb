// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Running counters and totals over completed generations.

use crate::time::Duration;

use super::correlator::CompletedGeneration;
use super::report::MetricsRecord;

/// Accumulates boundary counters and completed-cycle totals, and derives
/// one [`MetricsRecord`] per completion.
///
/// The counters count *firings* and advance even for cycles that never
/// complete; the totals only cover completed cycles. Averages divide by
/// the parent count (see [`MetricsRecord::average_child_render_time`]).
#[derive(Clone, Copy, Debug, Default)]
pub struct MetricsAggregator {
    parent_render_count: u64,
    child_render_count: u64,
    total_parent_time: Duration,
    total_child_time: Duration,
}

impl MetricsAggregator {
    /// Creates a zeroed aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one outer-boundary firing.
    pub fn note_parent(&mut self) {
        self.parent_render_count += 1;
    }

    /// Counts one inner-boundary firing, attributable or not.
    pub fn note_child(&mut self) {
        self.child_render_count += 1;
    }

    /// Folds a completed cycle into the totals and derives its record.
    ///
    /// `freeze` in the record means the freeze *held*: it was requested
    /// and the measured child cost was zero. An active cycle reports
    /// `false` however small its child time.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "averages are diagnostics; f64 precision suffices for realistic counts"
    )]
    pub fn complete(&mut self, cycle: &CompletedGeneration) -> MetricsRecord {
        self.total_parent_time = self.total_parent_time.saturating_add(cycle.parent_time);
        self.total_child_time = self.total_child_time.saturating_add(cycle.child_time);

        // The parent counter is never zero here: a cycle only completes
        // after its own outer firing was counted.
        let parents = self.parent_render_count as f64;

        MetricsRecord {
            parent_render_time: cycle.parent_time,
            child_render_time: cycle.child_time,
            freeze: cycle.freeze_requested && cycle.child_time == Duration::ZERO,
            parent_render_count: self.parent_render_count,
            child_render_count: self.child_render_count,
            total_parent_render_time: self.total_parent_time,
            total_child_render_time: self.total_child_time,
            average_parent_render_time: self.total_parent_time.ticks() as f64 / parents,
            average_child_render_time: self.total_child_time.ticks() as f64 / parents,
        }
    }

    /// Outer-boundary firings counted so far.
    #[must_use]
    pub fn parent_render_count(&self) -> u64 {
        self.parent_render_count
    }

    /// Inner-boundary firings counted so far.
    #[must_use]
    pub fn child_render_count(&self) -> u64 {
        self.child_render_count
    }
}

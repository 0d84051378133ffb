// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Metrics records and the report sink contract.

use alloc::string::String;

use crate::time::Duration;

/// One completed render cycle's effectiveness metrics.
///
/// Emitted synchronously at generation-completion time. Durations and
/// totals are in platform ticks; the averages are fractional ticks, since
/// they divide a total by a render count. Conversion to wall-clock units
/// happens at the diagnostics edge via a
/// [`Timebase`](crate::time::Timebase).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricsRecord {
    /// Time the outer boundary measured for this cycle.
    pub parent_render_time: Duration,
    /// Time the inner boundary measured, or zero for a frozen cycle where
    /// the subtree's render was expected to be absent.
    pub child_render_time: Duration,
    /// Whether the freeze held for this cycle: requested *and* the
    /// measured child cost was zero.
    pub freeze: bool,
    /// Outer-boundary firings so far, including incomplete cycles.
    pub parent_render_count: u64,
    /// Inner-boundary firings so far, including unattributable ones.
    pub child_render_count: u64,
    /// Sum of parent times over completed cycles.
    pub total_parent_render_time: Duration,
    /// Sum of child times over completed cycles.
    pub total_child_render_time: Duration,
    /// `total_parent_render_time / parent_render_count`, in ticks.
    pub average_parent_render_time: f64,
    /// `total_child_render_time / parent_render_count`, in ticks.
    ///
    /// Deliberately divided by the *parent* count: frozen cycles' implicit
    /// zero cost is amortized in, so this reads as the subtree's ongoing
    /// amortized cost rather than the per-render cost of the child alone.
    pub average_child_render_time: f64,
}

/// Error from a [`ReportSink`] call.
///
/// Sink failures never poison later generations: the profiler logs the
/// failure and the dropped record, and keeps correlating.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SinkError {
    /// The sink's output channel failed.
    #[error("metrics sink write failed: {0}")]
    Write(String),
}

/// Receives completed metrics records from a
/// [`FreezeProfiler`](super::FreezeProfiler).
pub trait ReportSink {
    /// Called once per completed generation, synchronously, in generation
    /// order.
    fn on_report(&mut self, record: &MetricsRecord) -> Result<(), SinkError>;
}

/// A [`ReportSink`] that discards all records.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopReportSink;

impl ReportSink for NoopReportSink {
    fn on_report(&mut self, _record: &MetricsRecord) -> Result<(), SinkError> {
        Ok(())
    }
}

/// A [`ReportSink`] that collects records into a vector.
///
/// Useful in tests and for batch export.
#[derive(Clone, Debug, Default)]
pub struct VecReportSink {
    /// The records received so far, in emission order.
    pub records: alloc::vec::Vec<MetricsRecord>,
}

impl ReportSink for VecReportSink {
    fn on_report(&mut self, record: &MetricsRecord) -> Result<(), SinkError> {
        self.records.push(*record);
        Ok(())
    }
}

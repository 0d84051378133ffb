// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-subtree profiler facade.

use alloc::string::String;

use crate::time::{Duration, HostTime};

use super::aggregate::MetricsAggregator;
use super::correlator::RenderCorrelator;
use super::report::ReportSink;

/// Measures one freeze scope's render effectiveness.
///
/// Wraps a freeze request plus the two measurement boundaries around the
/// scope: the outer boundary fires once per render cycle, the inner one
/// only when the wrapped subtree actually rendered. Each profiler owns a
/// private [`RenderCorrelator`] and [`MetricsAggregator`]; instances are
/// independent and must not be shared across subtrees.
///
/// Measurement defaults to enabled in debug builds only. A disabled
/// profiler ignores all boundary signals, so production builds pay nothing
/// beyond the flag check.
#[derive(Debug)]
pub struct FreezeProfiler<S: ReportSink> {
    name: String,
    enabled: bool,
    freeze: bool,
    correlator: RenderCorrelator,
    aggregator: MetricsAggregator,
    sink: S,
}

impl<S: ReportSink> FreezeProfiler<S> {
    /// Creates a profiler reporting to `sink`, enabled in debug builds.
    #[must_use]
    pub fn new(name: impl Into<String>, sink: S) -> Self {
        Self {
            name: name.into(),
            enabled: cfg!(debug_assertions),
            freeze: false,
            correlator: RenderCorrelator::new(),
            aggregator: MetricsAggregator::new(),
            sink,
        }
    }

    /// Overrides the build-dependent default.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The instance name, used to label reports and log lines.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether measurement is active.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The freeze request the next cycle will be attributed to.
    #[must_use]
    pub fn freeze(&self) -> bool {
        self.freeze
    }

    /// Sets the freeze request for subsequent cycles.
    pub fn set_freeze(&mut self, freeze: bool) {
        self.freeze = freeze;
    }

    /// Signals an outer-boundary firing with its measured duration.
    pub fn parent_rendered(&mut self, duration: Duration) {
        if !self.enabled {
            return;
        }
        self.aggregator.note_parent();
        if let Some(cycle) = self.correlator.parent_rendered(duration, self.freeze) {
            self.emit(&cycle);
        }
    }

    /// Signals an inner-boundary firing with its measured duration.
    pub fn child_rendered(&mut self, duration: Duration) {
        if !self.enabled {
            return;
        }
        // Counted even when the signal cannot be attributed to a cycle.
        self.aggregator.note_child();
        if let Some(cycle) = self.correlator.child_rendered(duration) {
            self.emit(&cycle);
        }
    }

    /// Like [`parent_rendered`](Self::parent_rendered), from raw
    /// timestamps.
    pub fn parent_span(&mut self, start: HostTime, end: HostTime) {
        self.parent_rendered(end.saturating_duration_since(start));
    }

    /// Like [`child_rendered`](Self::child_rendered), from raw timestamps.
    pub fn child_span(&mut self, start: HostTime, end: HostTime) {
        self.child_rendered(end.saturating_duration_since(start));
    }

    /// Incomplete generations currently held by the correlator.
    #[must_use]
    pub fn live_generations(&self) -> usize {
        self.correlator.live_generations()
    }

    /// Borrows the sink, e.g. to inspect collected records.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the profiler, returning its sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn emit(&mut self, cycle: &super::correlator::CompletedGeneration) {
        let record = self.aggregator.complete(cycle);
        if let Err(err) = self.sink.on_report(&record) {
            // Instrumentation is best-effort; a failing sink must not
            // poison later generations.
            log::warn!("metrics report '{}' dropped: {err}", self.name);
        }
    }
}

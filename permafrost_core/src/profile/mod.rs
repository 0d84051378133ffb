// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-effectiveness profiling.
//!
//! Answers the question a freeze flag alone cannot: *is the freeze
//! actually saving work?* A [`FreezeProfiler`] wraps one scope with two
//! measurement boundaries, a [`RenderCorrelator`] pairs their timing
//! signals into per-cycle samples keyed by [`Generation`], and a
//! [`MetricsAggregator`] folds completed cycles into running counters,
//! totals, and averages. Each completion synchronously emits one
//! [`MetricsRecord`] to a caller-supplied [`ReportSink`].
//!
//! Everything here is observation only: the profiler never feeds back into
//! the propagation engine, and a failing sink degrades to a log line.

mod aggregate;
mod correlator;
mod profiler;
mod report;

pub use aggregate::MetricsAggregator;
pub use correlator::{CompletedGeneration, Generation, RenderCorrelator};
pub use profiler::FreezeProfiler;
pub use report::{MetricsRecord, NoopReportSink, ReportSink, SinkError, VecReportSink};

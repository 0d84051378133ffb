// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable metrics output.
//!
//! [`PrettyPrintSink`] implements [`ReportSink`] and writes one line per
//! record to a [`Write`](std::io::Write) destination (default: stderr).
//! Durations are converted to microseconds using a [`Timebase`].

use std::io::Write;

use permafrost_core::profile::{MetricsRecord, ReportSink, SinkError};
use permafrost_core::time::Timebase;

/// Writes human-readable metrics lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }

    fn frac_ticks_to_us(&self, ticks: f64) -> f64 {
        ticks * f64::from(self.timebase.numer) / f64::from(self.timebase.denom) / 1000.0
    }
}

impl<W: Write> ReportSink for PrettyPrintSink<W> {
    fn on_report(&mut self, record: &MetricsRecord) -> Result<(), SinkError> {
        let held = if record.freeze { "held" } else { "off" };
        writeln!(
            self.writer,
            "[freeze] {held} parent={:.1}µs child={:.1}µs renders={}p/{}c avg={:.1}µs/{:.1}µs",
            self.ticks_to_us(record.parent_render_time.ticks()),
            self.ticks_to_us(record.child_render_time.ticks()),
            record.parent_render_count,
            record.child_render_count,
            self.frac_ticks_to_us(record.average_parent_render_time),
            self.frac_ticks_to_us(record.average_child_render_time),
        )
        .map_err(|e| SinkError::Write(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use permafrost_core::time::Duration;

    use super::*;

    fn sample_record() -> MetricsRecord {
        MetricsRecord {
            parent_render_time: Duration(5_000_000),
            child_render_time: Duration(0),
            freeze: true,
            parent_render_count: 3,
            child_render_count: 1,
            total_parent_render_time: Duration(12_000_000),
            total_child_render_time: Duration(4_000_000),
            average_parent_render_time: 4_000_000.0,
            average_child_render_time: 4_000_000.0 / 3.0,
        }
    }

    #[test]
    fn pretty_print_record() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        sink.on_report(&sample_record()).unwrap();
        let output = String::from_utf8(sink.writer).unwrap();
        assert!(output.contains("[freeze] held"), "got: {output}");
        assert!(output.contains("parent=5000.0µs"), "got: {output}");
        assert!(output.contains("child=0.0µs"), "got: {output}");
        assert!(output.contains("renders=3p/1c"), "got: {output}");
    }

    #[test]
    fn unfrozen_record_reads_off() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new(), Timebase::NANOS);
        let mut record = sample_record();
        record.freeze = false;
        sink.on_report(&record).unwrap();
        let output = String::from_utf8(sink.writer).unwrap();
        assert!(output.contains("[freeze] off"), "got: {output}");
    }
}

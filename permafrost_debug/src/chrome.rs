// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a
//! [`RecorderSink`](super::recorder::RecorderSink) and writes
//! [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use permafrost_core::time::Timebase;

use crate::recorder::decode;

/// Exports recorded metrics as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Records carry no absolute timestamps, so cycles are laid out
/// back-to-back: each cycle's parent render occupies a complete-event span
/// on track 0, an actually-rendered child nests on track 1, and a counter
/// track follows the running averages.
///
/// Durations are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut cursor_us = 0.0_f64;

    for record in decode(bytes) {
        let parent_us = ticks_to_us(record.parent_render_time.ticks(), timebase);
        let child_us = ticks_to_us(record.child_render_time.ticks(), timebase);

        events.push(json!({
            "ph": "X",
            "name": "ParentRender",
            "cat": "Freeze",
            "ts": cursor_us,
            "dur": parent_us,
            "pid": 0,
            "tid": 0,
            "args": {
                "parent_render_count": record.parent_render_count,
                "freeze": record.freeze,
            }
        }));

        if record.child_render_time.ticks() > 0 {
            events.push(json!({
                "ph": "X",
                "name": "ChildRender",
                "cat": "Freeze",
                "ts": cursor_us,
                "dur": child_us,
                "pid": 0,
                "tid": 1,
                "args": {
                    "child_render_count": record.child_render_count,
                }
            }));
        }

        events.push(json!({
            "ph": "C",
            "name": "AverageRenderTime",
            "cat": "Freeze",
            "ts": cursor_us,
            "pid": 0,
            "args": {
                "parent_us": frac_ticks_to_us(record.average_parent_render_time, timebase),
                "child_us": frac_ticks_to_us(record.average_child_render_time, timebase),
            }
        }));

        cursor_us += parent_us;
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}

fn frac_ticks_to_us(ticks: f64, timebase: Timebase) -> f64 {
    ticks * f64::from(timebase.numer) / f64::from(timebase.denom) / 1000.0
}

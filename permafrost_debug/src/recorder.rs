// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary record encoding and decoding.
//!
//! [`RecorderSink`] implements [`ReportSink`] and encodes metrics records
//! into a `Vec<u8>` as fixed-size little-endian records. [`decode`] reads
//! them back as an iterator of [`MetricsRecord`].

use permafrost_core::profile::{MetricsRecord, ReportSink, SinkError};
use permafrost_core::time::Duration;

const TAG_RECORD: u8 = 1;

/// A [`ReportSink`] that encodes records into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }
}

impl ReportSink for RecorderSink {
    fn on_report(&mut self, record: &MetricsRecord) -> Result<(), SinkError> {
        self.write_u8(TAG_RECORD);
        self.write_u64(record.parent_render_time.ticks());
        self.write_u64(record.child_render_time.ticks());
        self.write_u8(u8::from(record.freeze));
        self.write_u64(record.parent_render_count);
        self.write_u64(record.child_render_count);
        self.write_u64(record.total_parent_render_time.ticks());
        self.write_u64(record.total_child_render_time.ticks());
        self.write_f64(record.average_parent_render_time);
        self.write_f64(record.average_child_render_time);
        Ok(())
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`MetricsRecord`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded records.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f64(&mut self) -> Option<f64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = f64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn decode_record(&mut self) -> Option<MetricsRecord> {
        Some(MetricsRecord {
            parent_render_time: Duration(self.read_u64()?),
            child_render_time: Duration(self.read_u64()?),
            freeze: self.read_u8()? != 0,
            parent_render_count: self.read_u64()?,
            child_render_count: self.read_u64()?,
            total_parent_render_time: Duration(self.read_u64()?),
            total_child_render_time: Duration(self.read_u64()?),
            average_parent_render_time: self.read_f64()?,
            average_child_render_time: self.read_f64()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = MetricsRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_RECORD => self.decode_record(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> MetricsRecord {
        MetricsRecord {
            parent_render_time: Duration(5_000_000),
            child_render_time: Duration(3_000_000),
            freeze: false,
            parent_render_count: 4,
            child_render_count: 3,
            total_parent_render_time: Duration(17_000_000),
            total_child_render_time: Duration(9_000_000),
            average_parent_render_time: 4_250_000.0,
            average_child_render_time: 2_250_000.0,
        }
    }

    #[test]
    fn round_trip_record() {
        let mut rec = RecorderSink::new();
        let orig = sample_record();
        rec.on_report(&orig).unwrap();

        let records: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], orig);
    }

    #[test]
    fn round_trip_frozen_record() {
        let mut rec = RecorderSink::new();
        let orig = MetricsRecord {
            child_render_time: Duration(0),
            freeze: true,
            ..sample_record()
        };
        rec.on_report(&orig).unwrap();

        let records: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(records.len(), 1);
        assert!(records[0].freeze);
        assert_eq!(records[0].child_render_time, Duration(0));
    }

    #[test]
    fn round_trip_multiple_records() {
        let mut rec = RecorderSink::new();
        for i in 1..=5 {
            let mut record = sample_record();
            record.parent_render_count = i;
            rec.on_report(&record).unwrap();
        }

        let records: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(records.len(), 5);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.parent_render_count, i as u64 + 1);
        }
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let records: Vec<_> = decode(&[]).collect();
        assert!(records.is_empty());
    }

    #[test]
    fn truncated_buffer_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_report(&sample_record()).unwrap();
        let bytes = rec.into_bytes();

        let records: Vec<_> = decode(&bytes[..bytes.len() - 4]).collect();
        assert!(records.is_empty());
    }
}

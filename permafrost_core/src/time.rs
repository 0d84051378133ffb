// Copyright 2026 the Permafrost Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic host time and timebase conversion.
//!
//! [`HostTime`] is a point in time expressed as platform-native monotonic
//! ticks; [`Duration`] is a span in the same units. Render measurements flow
//! through the crate as tick values and are only converted to wall-clock
//! units at the diagnostics edge, using a [`Timebase`] (the rational
//! ticks-to-nanoseconds factor, `mach_timebase_info` style).
//!
//! Conversions use `u128` intermediates to avoid overflow.

use core::fmt;
use core::ops::{Add, Sub};

/// A point in time expressed as platform-native monotonic ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Returns the duration between `self` and an earlier time, or zero if
    /// `earlier` is after `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for HostTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for HostTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Self) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({})", self.0)
    }
}

/// Rational conversion factor from ticks to nanoseconds.
///
/// `nanoseconds = ticks * numer / denom`
///
/// The correct instance for a given platform comes from the host engine
/// (e.g. `mach_timebase_info` on macOS). Hosts whose clocks already report
/// nanoseconds use [`Timebase::NANOS`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timebase {
    /// Numerator of the ticks-to-nanoseconds ratio.
    pub numer: u32,
    /// Denominator of the ticks-to-nanoseconds ratio.
    pub denom: u32,
}

impl Timebase {
    /// A timebase where ticks are already nanoseconds (1:1).
    pub const NANOS: Self = Self { numer: 1, denom: 1 };

    /// Creates a new timebase with the given numerator and denominator.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    #[inline]
    #[must_use]
    pub const fn new(numer: u32, denom: u32) -> Self {
        assert!(denom != 0, "timebase denominator must not be zero");
        Self { numer, denom }
    }

    /// Converts a tick count to nanoseconds.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn ticks_to_nanos(self, ticks: u64) -> u64 {
        let wide = ticks as u128 * self.numer as u128 / self.denom as u128;
        wide as u64
    }

    /// Converts nanoseconds to a tick count.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn nanos_to_ticks(self, nanos: u64) -> u64 {
        let wide = nanos as u128 * self.denom as u128 / self.numer as u128;
        wide as u64
    }
}

impl fmt::Debug for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timebase({}/{})", self.numer, self.denom)
    }
}

/// A duration in platform-native ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    /// A zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Converts this duration to nanoseconds using the given timebase.
    #[inline]
    #[must_use]
    pub const fn to_nanos(self, timebase: Timebase) -> u64 {
        timebase.ticks_to_nanos(self.0)
    }

    /// Creates a duration from a nanosecond value and timebase.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: u64, timebase: Timebase) -> Self {
        Self(timebase.nanos_to_ticks(nanos))
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Duration {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Duration {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nanos_round_trip_identity_timebase() {
        let tb = Timebase::NANOS;
        let d = Duration(5_000_000);
        assert_eq!(d.to_nanos(tb), 5_000_000, "identity timebase");
        assert_eq!(Duration::from_nanos(5_000_000, tb), d);
    }

    #[test]
    fn rational_timebase_conversion() {
        // 24 MHz tick source: 125/3 ticks-to-nanos.
        let tb = Timebase::new(125, 3);
        let ticks = 24_000_000_u64;
        assert_eq!(tb.ticks_to_nanos(ticks), 1_000_000_000, "24 MHz ticks make 1s");
        assert_eq!(tb.nanos_to_ticks(1_000_000_000), ticks);
    }

    #[test]
    fn overflow_safe_conversion() {
        let tb = Timebase::new(125, 3);
        // Would overflow u64 if multiplied naively.
        let _ = tb.ticks_to_nanos(u64::MAX / 2);
    }

    #[test]
    fn duration_arithmetic() {
        let a = Duration(100);
        let b = Duration(30);
        assert_eq!((a + b).ticks(), 130);
        assert_eq!((a - b).ticks(), 70);
        assert_eq!(a.saturating_sub(Duration(200)), Duration::ZERO);
        assert_eq!(a.saturating_add(b).ticks(), 130);
    }

    #[test]
    fn host_time_span() {
        let start = HostTime(1_000);
        let end = HostTime(1_450);
        assert_eq!(end - start, Duration(450));
        assert_eq!(end.saturating_duration_since(start), Duration(450));
        assert_eq!(start.saturating_duration_since(end), Duration::ZERO);
        assert_eq!(start + Duration(450), end);
    }
}

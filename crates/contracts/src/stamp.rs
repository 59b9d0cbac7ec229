//! Stamp - capture timestamp in integer nanoseconds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Capture timestamp.
///
/// Stored as nanoseconds so that exact-mode synchronization compares stamps
/// bit for bit and approximate-mode spreads are computed without rounding.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Stamp(u64);

impl Stamp {
    pub const ZERO: Stamp = Stamp(0);

    /// Build from a `(sec, nanosec)` pair as carried by message headers.
    #[inline]
    pub const fn new(sec: u32, nanosec: u32) -> Self {
        Self(sec as u64 * NANOS_PER_SEC + nanosec as u64)
    }

    #[inline]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Build from floating-point seconds, rounded to the nearest nanosecond.
    /// Negative and non-finite inputs clamp to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return Self::ZERO;
        }
        Self((secs * NANOS_PER_SEC as f64).round() as u64)
    }

    #[inline]
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / NANOS_PER_SEC as f64
    }

    #[inline]
    pub const fn sec(self) -> u64 {
        self.0 / NANOS_PER_SEC
    }

    #[inline]
    pub const fn subsec_nanos(self) -> u32 {
        (self.0 % NANOS_PER_SEC) as u32
    }

    /// Absolute distance between two stamps.
    #[inline]
    pub fn abs_diff(self, other: Stamp) -> Duration {
        Duration::from_nanos(self.0.abs_diff(other.0))
    }

    #[inline]
    pub fn saturating_add(self, d: Duration) -> Self {
        let nanos = u64::try_from(d.as_nanos()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(nanos))
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.sec(), self.subsec_nanos())
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::types::NANOS_PER_SECOND;

/// Simulated time.
///
/// Field order matters: the derived `Ord` compares seconds first and then
/// nanoseconds, which is the order LRU victim selection relies on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VirtualClock {
    seconds: u64,
    nanoseconds: u32,
}

impl VirtualClock {
    /// Create a clock at the given instant, normalizing excess nanoseconds
    pub fn new(seconds: u64, nanoseconds: u64) -> Self {
        let mut clock = Self::default();
        clock.advance(seconds, nanoseconds);
        clock
    }

    /// Advance the clock. Nanosecond overflow is carried into seconds, and
    /// seconds saturate instead of wrapping.
    pub fn advance(&mut self, extra_seconds: u64, extra_nanoseconds: u64) {
        // Both terms are below one second, so the sum cannot overflow
        let nanos = self.nanoseconds as u64 + extra_nanoseconds % NANOS_PER_SECOND;
        self.seconds = self
            .seconds
            .saturating_add(extra_seconds)
            .saturating_add(extra_nanoseconds / NANOS_PER_SECOND)
            .saturating_add(nanos / NANOS_PER_SECOND);
        self.nanoseconds = (nanos % NANOS_PER_SECOND) as u32;
    }

    /// Advance by a nanosecond duration only
    pub fn advance_ns(&mut self, nanoseconds: u64) {
        self.advance(0, nanoseconds);
    }

    /// Snapshot of the current instant
    pub fn now(&self) -> VirtualClock {
        *self
    }

    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    pub fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }

    /// Total elapsed time in nanoseconds, saturating on overflow
    pub fn as_nanos(&self) -> u64 {
        self.seconds
            .saturating_mul(NANOS_PER_SECOND)
            .saturating_add(self.nanoseconds as u64)
    }
}

impl fmt::Display for VirtualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.seconds, self.nanoseconds)
    }
}

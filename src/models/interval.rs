//! Absolute open intervals

use serde::{Deserialize, Serialize};

/// One continuous open period, in epoch seconds (inclusive bounds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: i64,
    pub stop: i64,
}

impl Interval {
    pub fn new(start: i64, stop: i64) -> Self {
        Self { start, stop }
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.start <= timestamp && timestamp <= self.stop
    }

    pub fn contains_span(&self, from: i64, to: i64) -> bool {
        self.contains(from) && self.contains(to)
    }

    pub fn duration_seconds(&self) -> i64 {
        self.stop - self.start
    }

    /// Compact `[start, stop]` form
    pub fn as_tuple(&self) -> [i64; 2] {
        [self.start, self.stop]
    }

    pub fn shifted(self, seconds: i64) -> Self {
        Self {
            start: self.start + seconds,
            stop: self.stop + seconds,
        }
    }
}

impl From<[i64; 2]> for Interval {
    fn from(pair: [i64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<(i64, i64)> for Interval {
    fn from((start, stop): (i64, i64)) -> Self {
        Self::new(start, stop)
    }
}

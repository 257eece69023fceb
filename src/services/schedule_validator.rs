//! Containment queries against generated intervals

use chrono::{DateTime, TimeZone};

use crate::models::interval::Interval;

/// Answers "is this instant/duration inside the schedule" with a linear scan
#[derive(Debug, Clone, Default)]
pub struct ScheduleValidator {
    intervals: Vec<Interval>,
}

impl ScheduleValidator {
    pub fn new(intervals: Vec<Interval>) -> Self {
        Self { intervals }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn contains_instant<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> bool {
        self.contains_timestamp(instant.timestamp())
    }

    /// Inclusive on both interval ends
    pub fn contains_timestamp(&self, timestamp: i64) -> bool {
        self.intervals.iter().any(|interval| interval.contains(timestamp))
    }

    /// True when `[instant, instant + duration]` lies inside a single interval.
    /// A span across two adjacent intervals (e.g. over a break) does not count.
    pub fn contains_duration<Tz: TimeZone>(&self, instant: &DateTime<Tz>, duration_seconds: i64) -> bool {
        let from = instant.timestamp();
        let to = from.saturating_add(duration_seconds);
        let (from, to) = (from.min(to), from.max(to));
        self.intervals
            .iter()
            .any(|interval| interval.contains_span(from, to))
    }
}

impl From<Vec<Interval>> for ScheduleValidator {
    fn from(intervals: Vec<Interval>) -> Self {
        Self::new(intervals)
    }
}

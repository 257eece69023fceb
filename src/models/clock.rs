//! Wall-clock times of day and break windows

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{HoursError, HoursResult};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

static CLOCK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("valid clock pattern"));

/// Parse an `HH:mm` clock string into minutes since midnight.
///
/// Any date prefix separated by a space or `T` is ignored, so
/// `"2024-05-01 10:30"` and `"2024-05-01T10:30"` both yield 630.
pub fn parse_clock_minutes(text: &str) -> HoursResult<u32> {
    let trimmed = text.trim();
    let clock = trimmed
        .rsplit(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or(trimmed);

    let caps = CLOCK_PATTERN
        .captures(clock)
        .ok_or_else(|| HoursError::InvalidTimeFormat(text.to_string()))?;

    let hour: u32 = caps[1]
        .parse()
        .map_err(|_| HoursError::InvalidTimeFormat(text.to_string()))?;
    let minute: u32 = caps[2]
        .parse()
        .map_err(|_| HoursError::InvalidTimeFormat(text.to_string()))?;

    Ok(hour * 60 + minute)
}

/// Format minutes since midnight as `HH:mm`, wrapping values past the end of the day.
pub fn format_minutes_as_clock(total_minutes: u32) -> String {
    let minutes = total_minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

// ---------------------------------------------------------------------------
// ClockTime
// ---------------------------------------------------------------------------

/// A time of day, stored as minutes since midnight (0..1440)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u32);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    pub fn from_minutes(minutes: u32) -> HoursResult<Self> {
        if minutes >= MINUTES_PER_DAY {
            return Err(HoursError::InvalidTimeFormat(format!(
                "{} minutes is past the end of the day",
                minutes
            )));
        }
        Ok(Self(minutes))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn seconds(self) -> i64 {
        i64::from(self.0) * 60
    }
}

impl FromStr for ClockTime {
    type Err = HoursError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_clock_minutes(s).map(ClockTime)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_minutes_as_clock(self.0))
    }
}

// ---------------------------------------------------------------------------
// BreakWindow
// ---------------------------------------------------------------------------

/// A pause inside an opening window, written `HH:mm-HH:mm`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BreakWindow {
    pub start: ClockTime,
    pub stop: ClockTime,
}

impl BreakWindow {
    /// Parse a break string. Degenerate breaks (`start >= stop`, e.g.
    /// `"00:00-00:00"`) mean "no break" and yield `None`.
    pub fn parse(text: &str) -> HoursResult<Option<Self>> {
        let (start, stop) = text
            .trim()
            .split_once('-')
            .ok_or_else(|| HoursError::InvalidTimeFormat(text.to_string()))?;

        let start: ClockTime = start.parse()?;
        let stop: ClockTime = stop.parse()?;

        if start < stop {
            Ok(Some(Self { start, stop }))
        } else {
            Ok(None)
        }
    }
}

impl fmt::Display for BreakWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.stop)
    }
}

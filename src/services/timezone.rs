//! Timezone offsets, host defaults and the "now" capability

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::{OffsetComponents, Tz};

use crate::error::{HoursError, HoursResult};

/// Maps a zone name or `±HH:MM` offset to a fixed GMT offset
#[cfg_attr(test, mockall::automock)]
pub trait OffsetResolver: Send + Sync {
    fn resolve_offset(&self, zone: &str) -> HoursResult<FixedOffset>;
}

/// Supplies the zone used when an enterprise has none configured
pub trait DefaultTimezoneProvider: Send + Sync {
    fn default_timezone(&self) -> String;
}

/// Source of the current instant, for callers that omit one
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

// ---------------------------------------------------------------------------
// Offset parsing
// ---------------------------------------------------------------------------

/// Parse `±HH:MM` (or `±HHMM`, `Z`, `UTC`, `GMT`) into a fixed offset
pub fn parse_offset(text: &str) -> Option<FixedOffset> {
    let trimmed = text.trim();
    if matches!(trimmed, "Z" | "UTC" | "GMT" | "Etc/UTC" | "Etc/GMT") {
        return FixedOffset::east_opt(0);
    }

    let sign = match trimmed.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let rest = &trimmed[1..];
    if !rest.is_ascii() {
        return None;
    }
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "00"),
    };
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..=59).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Format an offset as `±HH:MM`
pub fn format_offset(offset: FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

// ---------------------------------------------------------------------------
// TzDatabaseResolver
// ---------------------------------------------------------------------------

/// Resolves IANA names through the tz database.
///
/// Each zone maps to its standard (non-DST) offset as of a reference date, so
/// a zone always resolves to the same fixed offset.
#[derive(Debug, Clone, Copy)]
pub struct TzDatabaseResolver {
    reference: NaiveDateTime,
}

impl TzDatabaseResolver {
    pub fn new() -> Self {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN);
        Self::at(date.and_time(NaiveTime::MIN))
    }

    /// Resolve standard offsets as they stood at `reference` (UTC)
    pub fn at(reference: NaiveDateTime) -> Self {
        Self { reference }
    }
}

impl Default for TzDatabaseResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl OffsetResolver for TzDatabaseResolver {
    fn resolve_offset(&self, zone: &str) -> HoursResult<FixedOffset> {
        if let Some(offset) = parse_offset(zone) {
            return Ok(offset);
        }

        let tz: Tz = zone.trim().parse().map_err(|_| {
            tracing::warn!("Unknown timezone '{}'", zone);
            HoursError::UnknownTimezone(zone.to_string())
        })?;

        let seconds = tz
            .offset_from_utc_datetime(&self.reference)
            .base_utc_offset()
            .num_seconds();

        i32::try_from(seconds)
            .ok()
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| HoursError::UnknownTimezone(zone.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Default timezone and clocks
// ---------------------------------------------------------------------------

/// Default zone taken from configuration
#[derive(Debug, Clone)]
pub struct ConfiguredTimezone(pub String);

impl DefaultTimezoneProvider for ConfiguredTimezone {
    fn default_timezone(&self) -> String {
        self.0.clone()
    }
}

/// Host wall clock, in the host's local offset
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("+05:00").unwrap().local_minus_utc(), 5 * 3600);
        assert_eq!(parse_offset("-03:30").unwrap().local_minus_utc(), -(3 * 3600 + 1800));
        assert_eq!(parse_offset("+0530").unwrap().local_minus_utc(), 5 * 3600 + 1800);
        assert_eq!(parse_offset("UTC").unwrap().local_minus_utc(), 0);
        assert!(parse_offset("Europe/Paris").is_none());
        assert!(parse_offset("+25:00").is_none());
        assert!(parse_offset("+05:75").is_none());
        assert_eq!(parse_offset("-05").unwrap().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_parse_offset_requires_two_digit_fields() {
        assert!(parse_offset("+5").is_none());
        assert!(parse_offset("+5:5").is_none());
        assert!(parse_offset("+05:5").is_none());
        assert!(parse_offset("+5:00").is_none());
        assert!(parse_offset("+0x:00").is_none());
        assert!(parse_offset("+").is_none());
    }

    #[test]
    fn test_resolver_rejects_multibyte_offset() {
        let resolver = TzDatabaseResolver::new();
        assert_eq!(
            resolver.resolve_offset("+1é1"),
            Err(HoursError::UnknownTimezone("+1é1".to_string()))
        );
        assert!(parse_offset("+０５:００").is_none());
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(FixedOffset::east_opt(5 * 3600).unwrap()), "+05:00");
        assert_eq!(format_offset(FixedOffset::west_opt(3 * 3600 + 1800).unwrap()), "-03:30");
        assert_eq!(format_offset(FixedOffset::east_opt(0).unwrap()), "+00:00");
    }

    #[test]
    fn test_resolver_identity_for_offsets() {
        let resolver = TzDatabaseResolver::new();
        let offset = resolver.resolve_offset("+05:00").unwrap();
        assert_eq!(format_offset(offset), "+05:00");
    }

    #[test]
    fn test_resolver_uses_standard_offset() {
        let resolver = TzDatabaseResolver::new();
        assert_eq!(format_offset(resolver.resolve_offset("Europe/Moscow").unwrap()), "+03:00");
        assert_eq!(format_offset(resolver.resolve_offset("Asia/Kolkata").unwrap()), "+05:30");
        // Standard time, not summer time
        assert_eq!(format_offset(resolver.resolve_offset("Europe/Paris").unwrap()), "+01:00");
        assert_eq!(format_offset(resolver.resolve_offset("America/New_York").unwrap()), "-05:00");
    }

    #[test]
    fn test_resolver_unknown_zone() {
        let resolver = TzDatabaseResolver::new();
        assert_eq!(
            resolver.resolve_offset("Mars/Olympus_Mons"),
            Err(HoursError::UnknownTimezone("Mars/Olympus_Mons".to_string()))
        );
    }

    #[test]
    fn test_fixed_clock() {
        let instant = DateTime::parse_from_rfc3339("2024-05-06T10:00:00+02:00").unwrap();
        assert_eq!(FixedClock(instant).now(), instant);
        assert_eq!(ConfiguredTimezone("UTC".into()).default_timezone(), "UTC");
    }
}

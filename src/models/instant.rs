//! Parsing and formatting of query instants and calendar dates

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};

use crate::error::{HoursError, HoursResult};

/// `yyyy-MM-dd`
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// `yyyy-MM-dd HH:mm`
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse an instant from RFC 3339, `yyyy-MM-dd HH:mm` or `yyyy-MM-dd`.
///
/// Strings without an offset are read as UTC.
pub fn parse_instant(text: &str) -> HoursResult<DateTime<FixedOffset>> {
    let text = text.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant);
    }

    let naive = NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(text, DATE_FORMAT).map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|_| HoursError::InvalidInstant(text.to_string()))?;

    Ok(Utc.from_utc_datetime(&naive).fixed_offset())
}

/// Parse a `yyyy-MM-dd` calendar date
pub fn parse_date(text: &str) -> HoursResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| HoursError::InvalidInstant(text.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_date_time(value: NaiveDateTime) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

/// Lower-case full English weekday name, as used in schedule rules
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

pub fn date_weekday_name(date: NaiveDate) -> &'static str {
    weekday_name(date.weekday())
}

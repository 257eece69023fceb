//! Expansion of a weekly schedule into absolute open intervals

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime};

use super::timezone::OffsetResolver;
use crate::{
    error::HoursResult,
    models::{
        interval::Interval,
        schedule::{DayRule, WeekdaySelector},
    },
};

/// A day rule with its clock strings already reduced to seconds since midnight
struct CompiledRule<'a> {
    weekdays: &'a WeekdaySelector,
    start: i64,
    stop: i64,
    pause: Option<(i64, i64)>,
}

impl<'a> From<&'a DayRule> for CompiledRule<'a> {
    fn from(rule: &'a DayRule) -> Self {
        Self {
            weekdays: &rule.weekdays,
            start: rule.window.start.seconds(),
            stop: rule.window.stop.seconds(),
            pause: rule
                .window
                .break_window
                .map(|brk| (brk.start.seconds(), brk.stop.seconds())),
        }
    }
}

impl CompiledRule<'_> {
    /// Open segments of one day, split around the break. The break is clipped
    /// to the window and empty segments are dropped.
    fn segments(&self) -> Vec<(i64, i64)> {
        let segments = match self.pause {
            Some((pause_start, pause_stop)) => vec![
                (self.start, pause_start.clamp(self.start, self.stop)),
                (pause_stop.clamp(self.start, self.stop), self.stop),
            ],
            None => vec![(self.start, self.stop)],
        };
        segments.into_iter().filter(|(from, to)| from < to).collect()
    }
}

/// Builds concrete interval lists from weekly rules
#[derive(Clone)]
pub struct ScheduleGenerator {
    resolver: Arc<dyn OffsetResolver>,
}

impl ScheduleGenerator {
    pub fn new(resolver: Arc<dyn OffsetResolver>) -> Self {
        Self { resolver }
    }

    /// Expand `rules` over every date in `start_date..=end_date`.
    ///
    /// Rule times are read in `timezone` (a single fixed offset for the whole
    /// range); without one they are taken as UTC. Dates no rule matches are
    /// skipped, first match wins otherwise.
    pub fn generate(
        &self,
        rules: &[DayRule],
        start_date: NaiveDate,
        end_date: NaiveDate,
        timezone: Option<&str>,
    ) -> HoursResult<Vec<Interval>> {
        let offset_seconds = match timezone {
            Some(zone) => i64::from(self.resolver.resolve_offset(zone)?.local_minus_utc()),
            None => 0,
        };

        let compiled: Vec<CompiledRule<'_>> = rules.iter().map(CompiledRule::from).collect();
        let mut intervals = Vec::new();

        for date in start_date.iter_days().take_while(|date| *date <= end_date) {
            let weekday = date.weekday();
            let Some(rule) = compiled.iter().find(|rule| rule.weekdays.matches(weekday)) else {
                continue;
            };

            let midnight = date.and_time(NaiveTime::MIN).and_utc().timestamp();
            for (from, to) in rule.segments() {
                intervals.push(Interval::new(midnight + from, midnight + to).shifted(-offset_seconds));
            }
        }

        tracing::debug!(
            "Generated {} intervals for {} rules from {} to {}",
            intervals.len(),
            rules.len(),
            start_date,
            end_date
        );
        Ok(intervals)
    }

    /// Same as [`generate`](Self::generate), as `[start, stop]` pairs
    pub fn generate_compact(
        &self,
        rules: &[DayRule],
        start_date: NaiveDate,
        end_date: NaiveDate,
        timezone: Option<&str>,
    ) -> HoursResult<Vec<[i64; 2]>> {
        let intervals = self.generate(rules, start_date, end_date, timezone)?;
        Ok(intervals.iter().map(Interval::as_tuple).collect())
    }
}

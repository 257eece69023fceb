//! Work time validation: "is the business open" and "when can an order be placed"

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Timelike};

use super::timezone::{Clock, ConfiguredTimezone, DefaultTimezoneProvider, OffsetResolver, SystemClock, TzDatabaseResolver};
use crate::{
    error::{HoursError, HoursResult},
    models::{
        clock::{format_minutes_as_clock, MINUTES_PER_DAY},
        evaluation::{EvaluationResult, OrderVariant},
        instant::format_date,
        schedule::{OrderWindowConfig, Schedule},
    },
};

/// Result of one evaluation, with the enterprise-local date it was made for
struct Evaluation {
    result: EvaluationResult,
    enterprise_date: NaiveDate,
}

/// Stateless evaluator of a weekly schedule against query instants
#[derive(Clone)]
pub struct WorkTimeValidator {
    resolver: Arc<dyn OffsetResolver>,
    default_timezone: Arc<dyn DefaultTimezoneProvider>,
    clock: Arc<dyn Clock>,
}

impl WorkTimeValidator {
    pub fn new(
        resolver: Arc<dyn OffsetResolver>,
        default_timezone: Arc<dyn DefaultTimezoneProvider>,
    ) -> Self {
        Self {
            resolver,
            default_timezone,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used when callers omit the query instant
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now()
    }

    /// Check whether the enterprise is open at `instant` (or now).
    ///
    /// An empty schedule means the business never closes.
    pub fn is_open_now(
        &self,
        config: &OrderWindowConfig,
        instant: Option<DateTime<FixedOffset>>,
    ) -> HoursResult<EvaluationResult> {
        let instant = instant.unwrap_or_else(|| self.clock.now());
        self.evaluate(&config.schedule, config.timezone(), instant)
            .map(|evaluation| evaluation.result)
    }

    /// Next moment an order can be fulfilled, as `yyyy-MM-dd HH:mm`.
    ///
    /// While open, this is the caller's wall clock plus the lead time. While
    /// closed, it is the window start plus the lead time, on the next day once
    /// the window is over or the enterprise's day is already ahead.
    pub fn next_available_instant(
        &self,
        config: &OrderWindowConfig,
        instant: Option<DateTime<FixedOffset>>,
        variant: OrderVariant,
    ) -> HoursResult<String> {
        let instant = instant.unwrap_or_else(|| self.clock.now());
        let schedule = config.schedule.for_variant(variant);
        let evaluation = self.evaluate(&schedule, config.timezone(), instant)?;
        let result = evaluation.result;

        let lead = config.min_delivery_time_in_minutes + variant.extra_lead_minutes();

        let (date, minutes) = if result.is_open_now {
            let wall_clock = instant.hour() * 60 + instant.minute();
            (instant.date_naive(), wall_clock + lead)
        } else {
            let (Some(query), Some(start), Some(stop)) = (
                result.query_minutes,
                result.window_start_minutes,
                result.window_stop_minutes,
            ) else {
                return Err(HoursError::CannotComputeWindow(format!(
                    "Closed evaluation at {} carries no window",
                    instant
                )));
            };

            let date = if result.rolled_to_next_day {
                evaluation.enterprise_date
            } else if query >= stop {
                next_day(evaluation.enterprise_date)?
            } else {
                evaluation.enterprise_date
            };
            (date, start + lead)
        };

        let date = date
            .checked_add_signed(Duration::days(i64::from(minutes / MINUTES_PER_DAY)))
            .ok_or_else(|| HoursError::InvalidInstant(format!("{} is out of range", instant)))?;
        let slot = format!("{} {}", format_date(date), format_minutes_as_clock(minutes));

        tracing::debug!(
            "Next {} slot for {}: {} (open: {})",
            variant,
            instant,
            slot,
            result.is_open_now
        );
        Ok(slot)
    }

    /// Latest calendar date an order may target, as `yyyy-MM-dd`
    pub fn get_max_order_date(
        &self,
        config: &OrderWindowConfig,
        instant: Option<DateTime<FixedOffset>>,
    ) -> HoursResult<String> {
        let instant = instant.unwrap_or_else(|| self.clock.now());
        let horizon = Duration::minutes(i64::from(config.max_future_order_minutes));
        let latest = instant
            .checked_add_signed(horizon)
            .ok_or_else(|| HoursError::InvalidInstant(format!("{} + {} is out of range", instant, horizon)))?;
        Ok(format_date(latest.date_naive()))
    }

    fn evaluate(
        &self,
        schedule: &Schedule,
        timezone: Option<&str>,
        instant: DateTime<FixedOffset>,
    ) -> HoursResult<Evaluation> {
        if schedule.is_empty() {
            tracing::debug!("Empty schedule, open at {}", instant);
            return Ok(Evaluation {
                result: EvaluationResult::always_open(),
                enterprise_date: instant.date_naive(),
            });
        }

        let zone = match timezone {
            Some(zone) => zone.to_string(),
            None => self.default_timezone.default_timezone(),
        };
        let enterprise_offset = self.resolver.resolve_offset(&zone)?;

        // Caller offset in minutes behind UTC
        let caller_offset = -(instant.offset().local_minus_utc() / 60);
        let local_delta = enterprise_offset.local_minus_utc() / 60 + caller_offset;

        let wall_clock = (instant.hour() * 60 + instant.minute()) as i32;
        let adjusted = wall_clock + local_delta;
        let day_shift = adjusted.div_euclid(MINUTES_PER_DAY as i32);
        let query_minutes = adjusted.rem_euclid(MINUTES_PER_DAY as i32) as u32;

        let enterprise_date = instant
            .date_naive()
            .checked_add_signed(Duration::days(i64::from(day_shift)))
            .ok_or_else(|| HoursError::InvalidInstant(format!("{} is out of range", instant)))?;

        let weekday = enterprise_date.weekday();
        let rule = schedule
            .rule_for(weekday)
            .ok_or(HoursError::NoScheduleForDay(weekday))?;
        let window = rule.window;

        let result = EvaluationResult {
            is_open_now: window.is_open_at(query_minutes),
            rolled_to_next_day: day_shift > 0,
            rolled_to_previous_day: day_shift < 0,
            query_minutes: Some(query_minutes),
            window_start_minutes: Some(window.start.minutes()),
            window_stop_minutes: Some(window.stop.minutes()),
        };

        tracing::debug!(
            "Evaluated {} in zone {} (delta {} min): {} {} against {} -> open: {}",
            instant,
            zone,
            local_delta,
            enterprise_date,
            format_minutes_as_clock(query_minutes),
            window,
            result.is_open_now
        );

        Ok(Evaluation {
            result,
            enterprise_date,
        })
    }
}

impl Default for WorkTimeValidator {
    fn default() -> Self {
        Self::new(
            Arc::new(TzDatabaseResolver::new()),
            Arc::new(ConfiguredTimezone("UTC".to_string())),
        )
    }
}

fn next_day(date: NaiveDate) -> HoursResult<NaiveDate> {
    date.succ_opt()
        .ok_or_else(|| HoursError::InvalidInstant(format!("No day after {}", date)))
}

//! Weekly schedule models (day rules, windows, order window configuration)
//!
//! Raw `*Settings` structs are what callers and config files provide. They are
//! validated and converted once into the typed [`Schedule`] and
//! [`OrderWindowConfig`], which the services consume without re-checking.

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::clock::{BreakWindow, ClockTime};
use super::evaluation::OrderVariant;
use super::instant::weekday_name;
use crate::error::{HoursError, HoursResult};

/// Weekday token that matches every day
pub const ALL_DAYS: &str = "all";

// ---------------------------------------------------------------------------
// Raw settings
// ---------------------------------------------------------------------------

/// An opening window as written in configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WindowSettings {
    /// Opening time (HH:MM)
    pub start: String,
    /// Closing time (HH:MM)
    pub stop: String,
    /// Break (HH:MM-HH:MM), "00:00-00:00" for none
    #[serde(default, rename = "break")]
    pub break_time: Option<String>,
}

/// A day rule as written in configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DayRuleSettings {
    /// Weekday names ("monday".."sunday") or "all"
    #[validate(length(min = 1, message = "At least one weekday is required"))]
    pub days: Vec<String>,
    pub start: String,
    pub stop: String,
    #[serde(default, rename = "break")]
    pub break_time: Option<String>,
    /// Alternate window used for self-service (pickup) orders
    #[serde(default)]
    #[validate(nested)]
    pub self_service: Option<WindowSettings>,
}

/// Enterprise order window configuration as written by callers
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OrderWindowSettings {
    /// IANA zone name or "+HH:MM" offset
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub schedule: Vec<DayRuleSettings>,
    #[serde(default)]
    #[validate(range(min = 0, max = 10080, message = "Delivery lead time must be between 0 and 10080 minutes"))]
    pub min_delivery_time_in_minutes: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "Future order horizon cannot be negative"))]
    pub max_future_order_minutes: i64,
}

// ---------------------------------------------------------------------------
// WeekdaySelector
// ---------------------------------------------------------------------------

/// Which weekdays a rule applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WeekdaySelector {
    All,
    Days(Vec<Weekday>),
}

impl WeekdaySelector {
    pub fn matches(&self, weekday: Weekday) -> bool {
        match self {
            WeekdaySelector::All => true,
            WeekdaySelector::Days(days) => days.contains(&weekday),
        }
    }

    /// Parse weekday names; any "all" entry makes the selector match every day
    pub fn parse<S: AsRef<str>>(names: &[S]) -> HoursResult<Self> {
        if names.is_empty() {
            return Err(HoursError::InvalidConfig("Day rule has no weekdays".to_string()));
        }

        let mut days = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref().trim();
            if name.eq_ignore_ascii_case(ALL_DAYS) {
                return Ok(WeekdaySelector::All);
            }
            let day: Weekday = name
                .parse()
                .map_err(|_| HoursError::InvalidConfig(format!("Unknown weekday '{}'", name)))?;
            if !days.contains(&day) {
                days.push(day);
            }
        }
        Ok(WeekdaySelector::Days(days))
    }
}

impl fmt::Display for WeekdaySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekdaySelector::All => f.write_str(ALL_DAYS),
            WeekdaySelector::Days(days) => {
                let names: Vec<&str> = days.iter().map(|d| weekday_name(*d)).collect();
                f.write_str(&names.join(","))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// An opening window within one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    pub start: ClockTime,
    pub stop: ClockTime,
    pub break_window: Option<BreakWindow>,
}

impl Window {
    /// Build a window. Windows crossing midnight (stop before start) are
    /// rejected: express them as two rules on adjacent days.
    pub fn new(start: ClockTime, stop: ClockTime, break_window: Option<BreakWindow>) -> HoursResult<Self> {
        if stop < start {
            tracing::warn!("Rejecting overnight window {}-{}", start, stop);
            return Err(HoursError::InvalidConfig(format!(
                "Window {}-{} crosses midnight; split it across two days",
                start, stop
            )));
        }
        Ok(Self {
            start,
            stop,
            break_window,
        })
    }

    pub fn parse(start: &str, stop: &str, break_time: Option<&str>) -> HoursResult<Self> {
        let break_window = match break_time {
            Some(text) => BreakWindow::parse(text)?,
            None => None,
        };
        Self::new(start.parse()?, stop.parse()?, break_window)
    }

    /// Exclusive on both ends
    pub fn is_open_at(&self, minutes: u32) -> bool {
        self.start.minutes() < minutes && minutes < self.stop.minutes()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.stop)?;
        if let Some(brk) = self.break_window {
            write!(f, " break {}", brk)?;
        }
        Ok(())
    }
}

impl TryFrom<&WindowSettings> for Window {
    type Error = HoursError;

    fn try_from(settings: &WindowSettings) -> Result<Self, Self::Error> {
        Window::parse(&settings.start, &settings.stop, settings.break_time.as_deref())
    }
}

// ---------------------------------------------------------------------------
// DayRule
// ---------------------------------------------------------------------------

/// One weekly recurrence entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DayRule {
    pub weekdays: WeekdaySelector,
    pub window: Window,
    pub self_service: Option<Window>,
}

impl DayRule {
    pub fn new(weekdays: WeekdaySelector, window: Window) -> Self {
        Self {
            weekdays,
            window,
            self_service: None,
        }
    }

    pub fn with_self_service(mut self, window: Window) -> Self {
        self.self_service = Some(window);
        self
    }

    /// The window that applies to the given order variant
    pub fn window_for(&self, variant: OrderVariant) -> &Window {
        match (variant, &self.self_service) {
            (OrderVariant::SelfService, Some(window)) => window,
            _ => &self.window,
        }
    }
}

impl fmt::Display for DayRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.weekdays, self.window)?;
        if let Some(window) = &self.self_service {
            write!(f, " self-service {}", window)?;
        }
        Ok(())
    }
}

impl TryFrom<&DayRuleSettings> for DayRule {
    type Error = HoursError;

    fn try_from(settings: &DayRuleSettings) -> Result<Self, Self::Error> {
        let weekdays = WeekdaySelector::parse(&settings.days)?;
        let window = Window::parse(&settings.start, &settings.stop, settings.break_time.as_deref())?;
        let self_service = settings.self_service.as_ref().map(|window| Window::try_from(window)).transpose()?;
        Ok(Self {
            weekdays,
            window,
            self_service,
        })
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Ordered list of day rules.
///
/// Lookup is first-match-wins: put specific weekday rules before any "all"
/// catch-all, otherwise the catch-all shadows them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Schedule {
    rules: Vec<DayRule>,
}

impl Schedule {
    pub fn new(rules: Vec<DayRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[DayRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// First rule whose weekday selector matches
    pub fn rule_for(&self, weekday: Weekday) -> Option<&DayRule> {
        self.rules.iter().find(|rule| rule.weekdays.matches(weekday))
    }

    /// Copy of this schedule where each rule's window is the one used by `variant`
    pub fn for_variant(&self, variant: OrderVariant) -> Schedule {
        let rules = self
            .rules
            .iter()
            .map(|rule| DayRule {
                weekdays: rule.weekdays.clone(),
                window: *rule.window_for(variant),
                self_service: None,
            })
            .collect();
        Schedule { rules }
    }

    /// Canonical text form, stable across equal schedules
    pub fn canonical(&self) -> String {
        self.rules
            .iter()
            .map(|rule| rule.to_string())
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl TryFrom<&[DayRuleSettings]> for Schedule {
    type Error = HoursError;

    fn try_from(settings: &[DayRuleSettings]) -> Result<Self, Self::Error> {
        for rule in settings {
            rule.validate()?;
        }
        let rules = settings
            .iter()
            .map(|rule| DayRule::try_from(rule))
            .collect::<HoursResult<Vec<_>>>()?;
        Ok(Self { rules })
    }
}

// ---------------------------------------------------------------------------
// EnterpriseContext / OrderWindowConfig
// ---------------------------------------------------------------------------

/// The business whose hours are evaluated
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EnterpriseContext {
    /// IANA zone name or "+HH:MM" offset; `None` falls back to the host default
    pub timezone: Option<String>,
}

/// Validated schedule plus ordering limits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "OrderWindowSettings")]
pub struct OrderWindowConfig {
    pub enterprise: EnterpriseContext,
    pub schedule: Schedule,
    /// Minimum lead time before delivery or pickup
    pub min_delivery_time_in_minutes: u32,
    /// How far ahead an order may be scheduled
    pub max_future_order_minutes: u32,
}

impl OrderWindowConfig {
    pub fn new(schedule: Schedule, timezone: Option<String>) -> Self {
        Self {
            enterprise: EnterpriseContext { timezone },
            schedule,
            min_delivery_time_in_minutes: 0,
            max_future_order_minutes: 0,
        }
    }

    pub fn with_min_delivery_time(mut self, minutes: u32) -> Self {
        self.min_delivery_time_in_minutes = minutes;
        self
    }

    pub fn with_max_future_order(mut self, minutes: u32) -> Self {
        self.max_future_order_minutes = minutes;
        self
    }

    pub fn timezone(&self) -> Option<&str> {
        self.enterprise.timezone.as_deref()
    }
}

impl TryFrom<OrderWindowSettings> for OrderWindowConfig {
    type Error = HoursError;

    fn try_from(settings: OrderWindowSettings) -> Result<Self, Self::Error> {
        settings.validate()?;

        let schedule = Schedule::try_from(settings.schedule.as_slice())?;
        let timezone = settings
            .timezone
            .map(|tz| tz.trim().to_string())
            .filter(|tz| !tz.is_empty());

        let to_minutes = |value: i64, field: &str| {
            u32::try_from(value)
                .map_err(|_| HoursError::InvalidConfig(format!("{} out of range: {}", field, value)))
        };

        Ok(Self {
            enterprise: EnterpriseContext { timezone },
            schedule,
            min_delivery_time_in_minutes: to_minutes(
                settings.min_delivery_time_in_minutes,
                "min_delivery_time_in_minutes",
            )?,
            max_future_order_minutes: to_minutes(
                settings.max_future_order_minutes,
                "max_future_order_minutes",
            )?,
        })
    }
}

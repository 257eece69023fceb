//! Data models for storefront hours

pub mod clock;
pub mod evaluation;
pub mod instant;
pub mod interval;
pub mod schedule;

// Re-export commonly used types
pub use clock::{format_minutes_as_clock, parse_clock_minutes, BreakWindow, ClockTime};
pub use evaluation::{EvaluationResult, OrderVariant};
pub use instant::{format_date, format_date_time, parse_date, parse_instant};
pub use interval::Interval;
pub use schedule::{
    DayRule, DayRuleSettings, EnterpriseContext, OrderWindowConfig, OrderWindowSettings, Schedule,
    WeekdaySelector, Window, WindowSettings,
};

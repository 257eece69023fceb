//! Storefront business hours
//!
//! Answers "is the business open at instant T, and if not, when can the next
//! order be placed or fulfilled" from a weekly schedule and a timezone, and
//! expands weekly schedules into absolute open intervals for containment
//! queries.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{HoursError, HoursResult};
pub use services::{
    schedule_generator::ScheduleGenerator, schedule_validator::ScheduleValidator,
    work_time::WorkTimeValidator, Services,
};

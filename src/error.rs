//! Error types for storefront hours evaluation

use chrono::Weekday;
use serde::Serialize;
use thiserror::Error;

use crate::models::instant::weekday_name;

/// Stable error codes exposed to callers that need a numeric mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u32)]
pub enum ErrorCode {
    InvalidConfig = 1,
    InvalidInstant = 2,
    InvalidTimeFormat = 3,
    NoScheduleForDay = 4,
    UnknownTimezone = 5,
    CannotComputeWindow = 6,
}

/// Main error type for hours evaluation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HoursError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid instant: {0}")]
    InvalidInstant(String),

    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    #[error("No schedule for {}", weekday_name(*.0))]
    NoScheduleForDay(Weekday),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Cannot compute window: {0}")]
    CannotComputeWindow(String),
}

impl HoursError {
    pub fn code(&self) -> ErrorCode {
        match self {
            HoursError::InvalidConfig(_) => ErrorCode::InvalidConfig,
            HoursError::InvalidInstant(_) => ErrorCode::InvalidInstant,
            HoursError::InvalidTimeFormat(_) => ErrorCode::InvalidTimeFormat,
            HoursError::NoScheduleForDay(_) => ErrorCode::NoScheduleForDay,
            HoursError::UnknownTimezone(_) => ErrorCode::UnknownTimezone,
            HoursError::CannotComputeWindow(_) => ErrorCode::CannotComputeWindow,
        }
    }
}

impl From<validator::ValidationErrors> for HoursError {
    fn from(errors: validator::ValidationErrors) -> Self {
        HoursError::InvalidConfig(errors.to_string())
    }
}

/// Error response body, for callers that surface failures as JSON
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl From<&HoursError> for ErrorResponse {
    fn from(err: &HoursError) -> Self {
        let code = err.code();
        Self {
            code: code as u32,
            error: format!("{:?}", code),
            message: err.to_string(),
        }
    }
}

/// Result type alias for hours operations
pub type HoursResult<T> = Result<T, HoursError>;

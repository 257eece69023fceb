//! Evaluation results and order variants

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fulfillment mode an order slot is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderVariant {
    Delivery,
    SelfService,
}

impl OrderVariant {
    /// Extra lead time added on top of the configured minimum
    pub fn extra_lead_minutes(self) -> u32 {
        match self {
            OrderVariant::Delivery => 1,
            OrderVariant::SelfService => 0,
        }
    }
}

impl fmt::Display for OrderVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderVariant::Delivery => f.write_str("delivery"),
            OrderVariant::SelfService => f.write_str("self_service"),
        }
    }
}

/// Outcome of an "is the business open" check.
///
/// Minute fields are in the enterprise's wall clock and are absent when the
/// schedule is empty (always open).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub is_open_now: bool,
    /// The enterprise's day is already ahead of the caller's
    pub rolled_to_next_day: bool,
    /// The enterprise's day is still behind the caller's
    #[serde(default)]
    pub rolled_to_previous_day: bool,
    pub query_minutes: Option<u32>,
    pub window_start_minutes: Option<u32>,
    pub window_stop_minutes: Option<u32>,
}

impl EvaluationResult {
    pub fn always_open() -> Self {
        Self {
            is_open_now: true,
            rolled_to_next_day: false,
            rolled_to_previous_day: false,
            query_minutes: None,
            window_start_minutes: None,
            window_stop_minutes: None,
        }
    }
}

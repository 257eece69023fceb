//! End-to-end tests over the public API

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde_json::json;

use storefront_hours::{
    config::AppConfig,
    models::{
        clock::{format_minutes_as_clock, parse_clock_minutes},
        evaluation::OrderVariant,
        instant::parse_instant,
        schedule::OrderWindowConfig,
    },
    HoursError, ScheduleValidator, Services,
};

fn enterprise(value: serde_json::Value) -> OrderWindowConfig {
    serde_json::from_value(value).expect("valid enterprise config")
}

fn at(text: &str) -> Option<DateTime<FixedOffset>> {
    Some(parse_instant(text).expect("valid instant"))
}

fn services() -> Services {
    Services::new(&AppConfig::default())
}

#[test]
fn test_clock_helpers_round_trip() {
    for m in (0..5000).step_by(37) {
        assert_eq!(parse_clock_minutes(&format_minutes_as_clock(m)).unwrap(), m % 1440);
    }
}

#[test]
fn test_storefront_scenario() {
    let config = enterprise(json!({
        "timezone": "+05:00",
        "min_delivery_time_in_minutes": 60,
        "schedule": [
            { "days": ["all"], "start": "10:00", "stop": "20:00", "break": "00:00-00:00" }
        ]
    }));
    let services = services();

    let status = services
        .work_time
        .is_open_now(&config, at("2024-05-06T01:00:00Z"))
        .unwrap();
    assert!(!status.is_open_now);
    assert_eq!(status.query_minutes, Some(360));
    assert_eq!(status.window_start_minutes, Some(600));

    let slot = services
        .work_time
        .next_available_instant(&config, at("2024-05-06T01:00:00Z"), OrderVariant::Delivery)
        .unwrap();
    assert_eq!(slot, "2024-05-06 11:01");
}

#[test]
fn test_empty_schedule_is_open() {
    let config = enterprise(json!({ "timezone": "Europe/Paris" }));
    let services = services();
    for instant in ["2024-05-06 03:00", "2024-12-25 23:59"] {
        assert!(services.work_time.is_open_now(&config, at(instant)).unwrap().is_open_now);
    }
}

#[test]
fn test_missing_weekday_is_reported() {
    let config = enterprise(json!({
        "timezone": "UTC",
        "schedule": [
            { "days": ["monday", "tuesday"], "start": "10:00", "stop": "20:00" }
        ]
    }));
    let err = services()
        .work_time
        .is_open_now(&config, at("2024-05-08 12:00"))
        .unwrap_err();
    assert!(matches!(err, HoursError::NoScheduleForDay(chrono::Weekday::Wed)));
}

#[test]
fn test_self_service_window() {
    let config = enterprise(json!({
        "timezone": "UTC",
        "min_delivery_time_in_minutes": 15,
        "schedule": [{
            "days": ["all"],
            "start": "09:00",
            "stop": "21:00",
            "self_service": { "start": "11:00", "stop": "19:00", "break": "00:00-00:00" }
        }]
    }));
    let work_time = services().work_time;

    let delivery = work_time
        .next_available_instant(&config, at("2024-05-06 10:00"), OrderVariant::Delivery)
        .unwrap();
    let pickup = work_time
        .next_available_instant(&config, at("2024-05-06 10:00"), OrderVariant::SelfService)
        .unwrap();
    assert_eq!(delivery, "2024-05-06 10:16");
    assert_eq!(pickup, "2024-05-06 11:15");

    let late_pickup = work_time
        .next_available_instant(&config, at("2024-05-06 20:00"), OrderVariant::SelfService)
        .unwrap();
    assert_eq!(late_pickup, "2024-05-07 11:15");
}

#[test]
fn test_max_order_date() {
    let config = enterprise(json!({
        "timezone": "UTC",
        "max_future_order_minutes": 2880,
        "schedule": [{ "days": ["all"], "start": "10:00", "stop": "20:00" }]
    }));
    assert_eq!(
        services()
            .work_time
            .get_max_order_date(&config, at("2024-02-28 12:00"))
            .unwrap(),
        "2024-03-01"
    );
}

#[test]
fn test_generated_intervals_answer_containment() {
    let config = enterprise(json!({
        "timezone": "+03:00",
        "schedule": [
            { "days": ["monday", "tuesday", "wednesday", "thursday", "friday"],
              "start": "09:00", "stop": "18:00", "break": "13:00-14:00" },
            { "days": ["saturday", "sunday"], "start": "10:00", "stop": "16:00", "break": "00:00-00:00" }
        ]
    }));
    let services = services();

    let intervals = services
        .generator
        .generate(
            config.schedule.rules(),
            NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 19).unwrap(),
            config.timezone(),
        )
        .unwrap();
    assert_eq!(intervals.len(), 24);

    let validator = ScheduleValidator::new(intervals);

    // 13:00 local (+03:00) is 10:00 UTC: the break starts
    let break_start = Utc.with_ymd_and_hms(2024, 5, 6, 10, 0, 0).unwrap();
    let break_stop = Utc.with_ymd_and_hms(2024, 5, 6, 11, 0, 0).unwrap();
    assert!(validator.contains_instant(&break_start));
    assert!(validator.contains_instant(&break_stop));
    assert!(!validator.contains_duration(&break_start, 3600));

    let morning = Utc.with_ymd_and_hms(2024, 5, 6, 6, 30, 0).unwrap();
    assert!(validator.contains_duration(&morning, 90 * 60));

    let saturday_evening = Utc.with_ymd_and_hms(2024, 5, 11, 14, 0, 0).unwrap();
    assert!(!validator.contains_instant(&saturday_evening));
}

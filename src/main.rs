//! hours-check - report opening status for the configured enterprise
//!
//! Usage: `hours-check [INSTANT]`, where INSTANT is RFC 3339,
//! `yyyy-MM-dd HH:mm` or `yyyy-MM-dd`. Defaults to now.

use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_hours::{
    config::{AppConfig, LoggingConfig},
    error::{ErrorResponse, HoursResult},
    models::{evaluation::OrderVariant, instant::parse_instant, schedule::OrderWindowConfig},
    services::cache::CachedWorkTimeValidator,
    HoursError, Services,
};

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    tracing::info!("Starting hours-check v{}", env!("CARGO_PKG_VERSION"));

    let enterprise = config
        .enterprise
        .clone()
        .context("No [enterprise] section in configuration")?;

    let services = Services::new(&config);
    let validator = &services.work_time;

    let outcome = std::env::args()
        .nth(1)
        .map_or_else(|| Ok(validator.validator().now()), |text| parse_instant(&text))
        .and_then(|instant| report(validator, &enterprise, instant));

    match outcome {
        Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
        Err(err) => {
            tracing::error!("Evaluation failed: {}", err);
            println!("{}", serde_json::to_string_pretty(&ErrorResponse::from(&err))?);
            std::process::exit(exit_code(&err));
        }
    }

    Ok(())
}

fn report(
    validator: &CachedWorkTimeValidator,
    enterprise: &OrderWindowConfig,
    instant: DateTime<FixedOffset>,
) -> HoursResult<serde_json::Value> {
    let status = validator.is_open_now(enterprise, Some(instant))?;
    let delivery = validator.next_available_instant(enterprise, Some(instant), OrderVariant::Delivery)?;
    let self_service =
        validator.next_available_instant(enterprise, Some(instant), OrderVariant::SelfService)?;
    let max_order_date = validator.get_max_order_date(enterprise, Some(instant))?;

    tracing::info!("Evaluated schedule at {}", instant);

    Ok(json!({
        "instant": instant.to_rfc3339(),
        "status": status,
        "next_delivery": delivery,
        "next_self_service": self_service,
        "max_order_date": max_order_date,
    }))
}

/// Exit status for a failed evaluation; 1 stays reserved for startup failures
fn exit_code(err: &HoursError) -> i32 {
    1 + err.code() as i32
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("storefront_hours={},hours_check={}", logging.level, logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

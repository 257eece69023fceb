//! Configuration management for storefront hours

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::models::schedule::OrderWindowConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimezoneConfig {
    /// Zone used when an enterprise has none configured
    pub default_zone: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub timezone: TimezoneConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    /// Schedule of the enterprise checked by the `hours-check` binary
    #[serde(default)]
    pub enterprise: Option<OrderWindowConfig>,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (HOURS_LOGGING__LEVEL -> logging.level)
            .add_source(Self::environment())
            // Override default zone from TZ_DEFAULT env var if present
            .set_override_option("timezone.default_zone", env::var("TZ_DEFAULT").ok())?
            .build()?;

        config.try_deserialize()
    }

    fn environment() -> Environment {
        Environment::with_prefix("HOURS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            default_zone: "UTC".to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 1024,
        }
    }
}

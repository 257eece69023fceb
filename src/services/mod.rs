//! Hours evaluation services

pub mod cache;
pub mod schedule_generator;
pub mod schedule_validator;
pub mod timezone;
pub mod work_time;

use std::sync::Arc;

use crate::config::AppConfig;

use self::{
    cache::{CachedWorkTimeValidator, EvaluationCache, InMemoryEvaluationCache, NoopEvaluationCache},
    schedule_generator::ScheduleGenerator,
    timezone::{ConfiguredTimezone, OffsetResolver, TzDatabaseResolver},
    work_time::WorkTimeValidator,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub work_time: CachedWorkTimeValidator,
    pub generator: ScheduleGenerator,
}

impl Services {
    /// Wire services from configuration
    pub fn new(config: &AppConfig) -> Self {
        let resolver: Arc<dyn OffsetResolver> = Arc::new(TzDatabaseResolver::new());
        Self::with_resolver(config, resolver)
    }

    /// Wire services around a caller-supplied offset resolver
    pub fn with_resolver(config: &AppConfig, resolver: Arc<dyn OffsetResolver>) -> Self {
        let default_timezone = Arc::new(ConfiguredTimezone(config.timezone.default_zone.clone()));
        let validator = WorkTimeValidator::new(resolver.clone(), default_timezone);

        let cache: Arc<dyn EvaluationCache> = if config.cache.enabled {
            Arc::new(InMemoryEvaluationCache::new(config.cache.max_entries))
        } else {
            Arc::new(NoopEvaluationCache)
        };

        Self {
            work_time: CachedWorkTimeValidator::new(validator, cache),
            generator: ScheduleGenerator::new(resolver),
        }
    }
}

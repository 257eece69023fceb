//! Memoization of work time evaluations
//!
//! Results are keyed by a SHA-256 digest of the full request: operation,
//! canonical schedule, timezone, lead/horizon settings, instant and variant.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use sha2::{Digest, Sha256};

use super::work_time::WorkTimeValidator;
use crate::{
    error::HoursResult,
    models::{
        evaluation::{EvaluationResult, OrderVariant},
        schedule::OrderWindowConfig,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachedOperation {
    IsOpenNow,
    NextAvailableInstant,
    MaxOrderDate,
}

impl CachedOperation {
    fn as_str(self) -> &'static str {
        match self {
            CachedOperation::IsOpenNow => "is_open_now",
            CachedOperation::NextAvailableInstant => "next_available_instant",
            CachedOperation::MaxOrderDate => "max_order_date",
        }
    }
}

/// Content-addressed cache key (hex SHA-256)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(
        operation: CachedOperation,
        config: &OrderWindowConfig,
        instant: &DateTime<FixedOffset>,
        variant: Option<OrderVariant>,
    ) -> Self {
        let mut hasher = Sha256::new();
        let parts = [
            operation.as_str().to_string(),
            config.schedule.canonical(),
            config.timezone().unwrap_or_default().to_string(),
            config.min_delivery_time_in_minutes.to_string(),
            config.max_future_order_minutes.to_string(),
            instant.to_rfc3339(),
            variant.map(|v| v.to_string()).unwrap_or_default(),
        ];
        for part in &parts {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        CacheKey(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedValue {
    Evaluation(EvaluationResult),
    Text(String),
}

/// Storage for memoized results
pub trait EvaluationCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<CachedValue>;
    fn put(&self, key: CacheKey, value: CachedValue);
    fn len(&self) -> usize;
    fn clear(&self);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounded in-process cache, evicting the oldest entry first
pub struct InMemoryEvaluationCache {
    entries: Mutex<IndexMap<CacheKey, CachedValue>>,
    max_entries: usize,
}

impl InMemoryEvaluationCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
            max_entries: max_entries.max(1),
        }
    }
}

impl EvaluationCache for InMemoryEvaluationCache {
    fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn put(&self, key: CacheKey, value: CachedValue) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            entries.shift_remove_index(0);
        }
        entries.insert(key, value);
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Cache that stores nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvaluationCache;

impl EvaluationCache for NoopEvaluationCache {
    fn get(&self, _key: &CacheKey) -> Option<CachedValue> {
        None
    }

    fn put(&self, _key: CacheKey, _value: CachedValue) {}

    fn len(&self) -> usize {
        0
    }

    fn clear(&self) {}
}

/// [`WorkTimeValidator`] with memoized results. Errors are never cached.
#[derive(Clone)]
pub struct CachedWorkTimeValidator {
    inner: WorkTimeValidator,
    cache: Arc<dyn EvaluationCache>,
}

impl CachedWorkTimeValidator {
    pub fn new(inner: WorkTimeValidator, cache: Arc<dyn EvaluationCache>) -> Self {
        Self { inner, cache }
    }

    pub fn validator(&self) -> &WorkTimeValidator {
        &self.inner
    }

    pub fn is_open_now(
        &self,
        config: &OrderWindowConfig,
        instant: Option<DateTime<FixedOffset>>,
    ) -> HoursResult<EvaluationResult> {
        let instant = instant.unwrap_or_else(|| self.inner.now());
        let key = CacheKey::new(CachedOperation::IsOpenNow, config, &instant, None);

        if let Some(CachedValue::Evaluation(result)) = self.cache.get(&key) {
            tracing::debug!("Cache hit for {}", key.as_str());
            return Ok(result);
        }

        let result = self.inner.is_open_now(config, Some(instant))?;
        self.cache.put(key, CachedValue::Evaluation(result));
        Ok(result)
    }

    pub fn next_available_instant(
        &self,
        config: &OrderWindowConfig,
        instant: Option<DateTime<FixedOffset>>,
        variant: OrderVariant,
    ) -> HoursResult<String> {
        let instant = instant.unwrap_or_else(|| self.inner.now());
        let key = CacheKey::new(CachedOperation::NextAvailableInstant, config, &instant, Some(variant));
        self.text_or_compute(key, || self.inner.next_available_instant(config, Some(instant), variant))
    }

    pub fn get_max_order_date(
        &self,
        config: &OrderWindowConfig,
        instant: Option<DateTime<FixedOffset>>,
    ) -> HoursResult<String> {
        let instant = instant.unwrap_or_else(|| self.inner.now());
        let key = CacheKey::new(CachedOperation::MaxOrderDate, config, &instant, None);
        self.text_or_compute(key, || self.inner.get_max_order_date(config, Some(instant)))
    }

    fn text_or_compute<F>(&self, key: CacheKey, compute: F) -> HoursResult<String>
    where
        F: FnOnce() -> HoursResult<String>,
    {
        if let Some(CachedValue::Text(text)) = self.cache.get(&key) {
            tracing::debug!("Cache hit for {}", key.as_str());
            return Ok(text);
        }

        let text = compute()?;
        self.cache.put(key, CachedValue::Text(text.clone()));
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HoursError;
    use crate::models::schedule::{DayRule, Schedule, WeekdaySelector, Window};
    use crate::services::timezone::{ConfiguredTimezone, MockOffsetResolver};

    fn config(timezone: &str) -> OrderWindowConfig {
        let rule = DayRule::new(WeekdaySelector::All, Window::parse("10:00", "20:00", None).unwrap());
        OrderWindowConfig::new(Schedule::new(vec![rule]), Some(timezone.to_string()))
            .with_min_delivery_time(30)
    }

    fn instant(text: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(text).unwrap()
    }

    fn cached_with(resolver: MockOffsetResolver, cache: Arc<dyn EvaluationCache>) -> CachedWorkTimeValidator {
        let inner = WorkTimeValidator::new(
            Arc::new(resolver),
            Arc::new(ConfiguredTimezone("UTC".to_string())),
        );
        CachedWorkTimeValidator::new(inner, cache)
    }

    #[test]
    fn test_cache_key_is_content_addressed() {
        let at = instant("2024-05-06T12:00:00Z");
        let a = CacheKey::new(CachedOperation::IsOpenNow, &config("UTC"), &at, None);
        let b = CacheKey::new(CachedOperation::IsOpenNow, &config("UTC"), &at, None);
        let other_zone = CacheKey::new(CachedOperation::IsOpenNow, &config("+05:00"), &at, None);
        let other_variant = CacheKey::new(
            CachedOperation::NextAvailableInstant,
            &config("UTC"),
            &at,
            Some(OrderVariant::SelfService),
        );
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert_ne!(a, other_zone);
        assert_ne!(a, other_variant);
    }

    #[test]
    fn test_repeated_queries_hit_cache() {
        let mut resolver = MockOffsetResolver::new();
        resolver
            .expect_resolve_offset()
            .times(2)
            .returning(|_| Ok(FixedOffset::east_opt(0).unwrap()));

        let cache = Arc::new(InMemoryEvaluationCache::new(16));
        let validator = cached_with(resolver, cache.clone());
        let cfg = config("UTC");
        let at = Some(instant("2024-05-06T12:00:00Z"));

        let first = validator.is_open_now(&cfg, at).unwrap();
        let second = validator.is_open_now(&cfg, at).unwrap();
        assert_eq!(first, second);

        let slot = validator.next_available_instant(&cfg, at, OrderVariant::Delivery).unwrap();
        assert_eq!(validator.next_available_instant(&cfg, at, OrderVariant::Delivery).unwrap(), slot);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let mut resolver = MockOffsetResolver::new();
        resolver
            .expect_resolve_offset()
            .times(2)
            .returning(|zone| Err(HoursError::UnknownTimezone(zone.to_string())));

        let cache = Arc::new(InMemoryEvaluationCache::new(16));
        let validator = cached_with(resolver, cache.clone());
        let cfg = config("Nowhere/City");
        let at = Some(instant("2024-05-06T12:00:00Z"));

        assert!(validator.is_open_now(&cfg, at).is_err());
        assert!(validator.is_open_now(&cfg, at).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_oldest_entry_is_evicted() {
        let cache = InMemoryEvaluationCache::new(2);
        let cfg = config("UTC");
        let keys: Vec<CacheKey> = ["10:00", "11:00", "12:00"]
            .iter()
            .map(|clock| {
                let at = instant(&format!("2024-05-06T{}:00Z", clock));
                CacheKey::new(CachedOperation::MaxOrderDate, &cfg, &at, None)
            })
            .collect();

        for key in &keys {
            cache.put(key.clone(), CachedValue::Text(key.as_str().to_string()));
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&keys[0]).is_none());
        assert!(cache.get(&keys[2]).is_some());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_noop_cache_always_recomputes() {
        let mut resolver = MockOffsetResolver::new();
        resolver
            .expect_resolve_offset()
            .times(2)
            .returning(|_| Ok(FixedOffset::east_opt(0).unwrap()));

        let validator = cached_with(resolver, Arc::new(NoopEvaluationCache));
        let cfg = config("UTC");
        let at = Some(instant("2024-05-06T12:00:00Z"));
        validator.is_open_now(&cfg, at).unwrap();
        validator.is_open_now(&cfg, at).unwrap();
    }
}

//! Forecast memoization keyed by a digest of each station's inputs

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rand::RngExt;
use tracing::{debug, info};

use super::arima::MODEL_NAME;
use super::forecast::DayZero;
use crate::cache::PersistentCache;
use crate::config::ForecastConfig;
use crate::models::{AqiObservation, StationForecast};
use crate::{PlannerError, Result};

/// Content-derived key for one station's forecast.
///
/// Covers the station id, the full ordered series, the horizon and every
/// setting that changes the fitted model, so two regions asking for the same
/// horizon never share an entry unless their data is identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForecastCacheKey(String);

impl ForecastCacheKey {
    #[must_use]
    pub fn new(
        station_id: &str,
        observations: &[AqiObservation],
        horizon: usize,
        config: &ForecastConfig,
    ) -> Self {
        let mut context = md5::Context::new();
        context.consume(MODEL_NAME.as_bytes());
        context.consume([0u8]);
        context.consume(station_id.as_bytes());
        context.consume([0u8]);
        context.consume((horizon as u64).to_le_bytes());
        context.consume((config.min_observations as u64).to_le_bytes());
        match config.day_zero {
            DayZero::AfterLastObservation => context.consume([0u8]),
            DayZero::Date(date) => {
                context.consume([1u8]);
                context.consume(chrono::Datelike::num_days_from_ce(&date).to_le_bytes());
            }
        }
        context.consume((observations.len() as u64).to_le_bytes());
        for observation in observations {
            context.consume(chrono::Datelike::num_days_from_ce(&observation.date).to_le_bytes());
            context.consume(observation.aqi.to_bits().to_le_bytes());
        }
        Self(format!("forecast:{station_id}:{:x}", context.compute()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ForecastCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage for memoized station forecasts
pub trait ForecastCache: Send + Sync {
    fn get(&self, key: &ForecastCacheKey) -> Result<Option<StationForecast>>;
    fn put(&self, key: &ForecastCacheKey, forecast: &StationForecast) -> Result<()>;
}

/// Forecasts kept for the lifetime of one planner instance
#[derive(Debug, Default)]
pub struct MemoryForecastCache {
    entries: Mutex<HashMap<ForecastCacheKey, StationForecast>>,
}

impl MemoryForecastCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized forecasts
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| PlannerError::cache("forecast cache lock poisoned"))?
            .clear();
        Ok(())
    }
}

impl ForecastCache for MemoryForecastCache {
    fn get(&self, key: &ForecastCacheKey) -> Result<Option<StationForecast>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| PlannerError::cache("forecast cache lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &ForecastCacheKey, forecast: &StationForecast) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| PlannerError::cache("forecast cache lock poisoned"))?
            .insert(key.clone(), forecast.clone());
        Ok(())
    }
}

/// Forecasts kept on disk between runs, with a jittered expiry
pub struct PersistentForecastCache {
    cache: PersistentCache,
    ttl: Duration,
}

impl PersistentForecastCache {
    pub fn open(path: impl AsRef<Path>, ttl: Duration) -> Result<Self> {
        let path = path.as_ref();
        let cache = PersistentCache::open(path).map_err(|e| {
            PlannerError::cache(format!("Failed to open cache at {}: {e:#}", path.display()))
        })?;
        info!("Opened forecast cache at {}", path.display());
        Ok(Self { cache, ttl })
    }
}

impl ForecastCache for PersistentForecastCache {
    fn get(&self, key: &ForecastCacheKey) -> Result<Option<StationForecast>> {
        self.cache
            .get(key.as_str())
            .map_err(|e| PlannerError::cache(format!("{e:#}")))
    }

    fn put(&self, key: &ForecastCacheKey, forecast: &StationForecast) -> Result<()> {
        // spread expiry so a region's stations don't all refit on the same run
        let jitter: f32 = rand::rng().random_range(0.9..1.1);
        let ttl = self.ttl.mul_f32(jitter);
        debug!("Caching {} for {:?}", key, ttl);
        self.cache
            .put(key.as_str(), forecast, ttl)
            .map_err(|e| PlannerError::cache(format!("{e:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn observations(values: &[f64]) -> Vec<AqiObservation> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64);
                AqiObservation::new(date, *v)
            })
            .collect()
    }

    #[test]
    fn test_key_depends_on_all_inputs() {
        let config = ForecastConfig::default();
        let series = observations(&[10.0, 20.0, 30.0]);
        let base = ForecastCacheKey::new("DL001", &series, 5, &config);

        assert_eq!(base, ForecastCacheKey::new("DL001", &series, 5, &config));
        assert_ne!(base, ForecastCacheKey::new("DL002", &series, 5, &config));
        assert_ne!(base, ForecastCacheKey::new("DL001", &series, 4, &config));
        assert_ne!(
            base,
            ForecastCacheKey::new("DL001", &observations(&[10.0, 20.0, 31.0]), 5, &config)
        );

        let mut other_config = config.clone();
        other_config.day_zero = DayZero::Date(NaiveDate::from_ymd_opt(2020, 1, 10).unwrap());
        assert_ne!(base, ForecastCacheKey::new("DL001", &series, 5, &other_config));

        assert!(base.as_str().starts_with("forecast:DL001:"));
    }

    #[test]
    fn test_memory_cache_round_trip() {
        let cache = MemoryForecastCache::new();
        let key = ForecastCacheKey::new("A", &observations(&[1.0, 2.0, 3.0]), 2, &ForecastConfig::default());
        assert!(cache.get(&key).unwrap().is_none());

        let forecast = StationForecast::fitted(vec![4.0, 5.0], None);
        cache.put(&key, &forecast).unwrap();
        assert_eq!(cache.get(&key).unwrap(), Some(forecast));
        assert_eq!(cache.len(), 1);

        cache.clear().unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_persistent_cache_round_trip() {
        let dir = TempDir::new().unwrap();
        let key = ForecastCacheKey::new("A", &observations(&[1.0, 2.0, 3.0]), 1, &ForecastConfig::default());
        let forecast = StationForecast::failed(1, "constant");

        let cache = PersistentForecastCache::open(dir.path(), Duration::from_secs(3600)).unwrap();
        assert!(cache.get(&key).unwrap().is_none());
        cache.put(&key, &forecast).unwrap();
        assert_eq!(cache.get(&key).unwrap(), Some(forecast));
    }
}

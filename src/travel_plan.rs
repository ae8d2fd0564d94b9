//! Travel plan service
//!
//! Runs one planning invocation end to end: select the region's stations, load
//! their history, forecast, compute distances, rank and sequence.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PlannerConfig;
use crate::models::{AqiHistory, ForecastSeries, ForecastStatus, Itinerary, Station};
use crate::planner::{
    AqiForecaster, DistanceMatrix, ForecastCache, MemoryForecastCache, PersistentForecastCache,
    StationAqi, plan_itinerary_with, rank_by_forecast_day,
};
use crate::region::Region;
use crate::store::{AqiHistoryStore, StationStore};
use crate::{PlannerError, Result};

/// Everything one planning run produced
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    /// Region the stations were selected from, if any
    pub region: Option<Region>,
    /// Number of planned days
    pub horizon: usize,
    /// Stations in planning order; the first one is the starting point by default
    pub stations: Vec<Station>,
    pub forecasts: ForecastSeries,
    /// Stations ordered by day-0 forecast, cleanest first
    pub ranking: Vec<StationAqi>,
    pub itinerary: Itinerary,
    /// Per-station problems that did not stop the run
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Plans AQI-aware itineraries
pub struct TravelPlanner {
    config: PlannerConfig,
    forecaster: AqiForecaster,
}

impl TravelPlanner {
    /// Planner with an in-memory forecast cache when caching is enabled
    #[must_use]
    pub fn new(config: PlannerConfig) -> Self {
        let forecaster = AqiForecaster::new(config.forecast.clone());
        let forecaster = if config.cache.enabled {
            forecaster.with_cache(Arc::new(MemoryForecastCache::new()))
        } else {
            forecaster
        };
        Self { config, forecaster }
    }

    /// Planner with the cache backend the configuration asks for
    pub fn from_config(config: PlannerConfig) -> Result<Self> {
        if !(config.cache.enabled && config.cache.persistent) {
            return Ok(Self::new(config));
        }
        let ttl = Duration::from_secs(u64::from(config.cache.ttl_hours) * 3600);
        let cache = PersistentForecastCache::open(config.cache.resolved_location(), ttl)?;
        Ok(Self::with_cache(config, Arc::new(cache)))
    }

    /// Planner memoizing forecasts in `cache`
    #[must_use]
    pub fn with_cache(config: PlannerConfig, cache: Arc<dyn ForecastCache>) -> Self {
        let forecaster = AqiForecaster::new(config.forecast.clone()).with_cache(cache);
        Self { config, forecaster }
    }

    #[must_use]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan `horizon` days across the stations of `region`
    #[tracing::instrument(skip(self, store), fields(region_code = %region.code))]
    pub fn plan<S>(&self, store: &S, region: &Region, horizon: usize) -> Result<PlanReport>
    where
        S: StationStore + AqiHistoryStore + ?Sized,
    {
        let stations = store.stations_in_region(region.code)?;
        if stations.is_empty() {
            return Err(PlannerError::no_stations(format!(
                "no stations found for {}",
                region.name
            )));
        }
        info!("Planning {} days across {} stations in {}", horizon, stations.len(), region);

        let ids: Vec<String> = stations.iter().map(|s| s.id.clone()).collect();
        let history = store.history_for(&ids)?;
        debug!(
            "{} of {} stations have history ({} observations)",
            history.station_count(),
            stations.len(),
            history.observation_count()
        );

        let mut report = self.plan_stations(stations, &history, horizon)?;
        report.region = Some(*region);
        Ok(report)
    }

    /// Plan `horizon` days across an explicit station list
    pub fn plan_stations(
        &self,
        stations: Vec<Station>,
        history: &AqiHistory,
        horizon: usize,
    ) -> Result<PlanReport> {
        let forecasts = self.forecaster.forecast(&stations, history, horizon)?;
        let warnings = collect_warnings(&stations, &forecasts);

        let distances = DistanceMatrix::build(&stations, self.config.distance.model)?;
        let ranking = rank_by_forecast_day(&stations, &forecasts, 0);
        let itinerary =
            plan_itinerary_with(&stations, &forecasts, &distances, horizon, &self.config.itinerary)?;

        Ok(PlanReport {
            region: None,
            horizon,
            stations,
            forecasts,
            ranking,
            itinerary,
            warnings,
            generated_at: Utc::now(),
        })
    }
}

fn collect_warnings(stations: &[Station], forecasts: &ForecastSeries) -> Vec<String> {
    let mut warnings = Vec::new();
    for station in stations {
        let Some(forecast) = forecasts.get(&station.id) else {
            continue;
        };
        match &forecast.status {
            ForecastStatus::Fitted => {}
            ForecastStatus::NoHistory => {
                warnings.push(format!("{} ({}): no AQI history", station.name, station.id));
            }
            ForecastStatus::Failed { reason } => {
                warnings.push(format!(
                    "{} ({}): forecast unavailable, {reason}",
                    station.name, station.id
                ));
            }
        }
    }
    if !warnings.is_empty() {
        warn!("{} stations have no forecast", warnings.len());
    }
    warnings
}

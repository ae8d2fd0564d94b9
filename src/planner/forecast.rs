//! Per-station AQI forecasting
//!
//! Every station gets its own ARIMA(1,1,1) fit. A station whose model cannot be
//! fitted degrades to missing values and a warning; it never aborts the batch.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::arima::{Arima111, FitOptions};
use super::cache::{ForecastCache, ForecastCacheKey};
use crate::config::ForecastConfig;
use crate::error::ForecastError;
use crate::models::{AqiHistory, AqiObservation, ForecastSeries, Station, StationForecast};
use crate::{PlannerError, Result};

/// Which calendar day forecast day 0 stands for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayZero {
    /// Day 0 is the day after the last observation
    #[default]
    AfterLastObservation,
    /// Day 0 is this date; the days between the last observation and it are
    /// projected and dropped
    Date(NaiveDate),
}

impl DayZero {
    /// Projected steps that precede day 0
    #[must_use]
    pub fn lead_days(&self, last_observation: NaiveDate) -> usize {
        match self {
            DayZero::AfterLastObservation => 0,
            DayZero::Date(day_zero) => {
                let gap = day_zero.signed_duration_since(last_observation).num_days();
                if gap < 1 {
                    debug!(
                        "Day zero {} is not after last observation {}, forecasting from the next day",
                        day_zero, last_observation
                    );
                }
                usize::try_from(gap - 1).unwrap_or(0)
            }
        }
    }
}

/// Forecasts AQI for every station of a run
#[derive(Clone, Default)]
pub struct AqiForecaster {
    config: ForecastConfig,
    cache: Option<Arc<dyn ForecastCache>>,
}

impl AqiForecaster {
    #[must_use]
    pub fn new(config: ForecastConfig) -> Self {
        Self {
            config,
            cache: None,
        }
    }

    /// Memoize forecasts in `cache`
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ForecastCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast `horizon` days for each station.
    ///
    /// The result has exactly one entry per station and exactly `horizon` values per entry.
    pub fn forecast(
        &self,
        stations: &[Station],
        history: &AqiHistory,
        horizon: usize,
    ) -> Result<ForecastSeries> {
        if stations.is_empty() {
            return Err(PlannerError::no_stations("nothing to forecast"));
        }
        if horizon == 0 {
            return Err(PlannerError::InvalidHorizon {
                horizon,
                message: "forecast horizon must be at least one day".to_string(),
            });
        }

        info!("Forecasting {} days for {} stations", horizon, stations.len());

        for station in stations {
            ensure_finite_history(&station.id, history.series(&station.id))?;
        }

        let mut series = ForecastSeries::new(horizon);
        for station in stations {
            let forecast = self.forecast_station(&station.id, history.series(&station.id), horizon);
            series.insert(station.id.clone(), forecast);
        }

        let failed = series.failures().count();
        if failed > 0 {
            warn!("{} of {} station forecasts failed", failed, stations.len());
        }
        Ok(series)
    }

    /// Forecast a single station; failures become missing values
    #[tracing::instrument(level = "debug", skip(self, observations), fields(n_obs = observations.len()))]
    pub fn forecast_station(
        &self,
        station_id: &str,
        observations: &[AqiObservation],
        horizon: usize,
    ) -> StationForecast {
        if observations.is_empty() {
            debug!("No history for station {}", station_id);
            return StationForecast::no_history(horizon);
        }

        let key = ForecastCacheKey::new(station_id, observations, horizon, &self.config);
        if let Some(cache) = &self.cache {
            match cache.get(&key) {
                Ok(Some(hit)) if hit.horizon() == horizon => {
                    debug!("Using cached forecast for station {}", station_id);
                    return hit;
                }
                Ok(_) => {}
                Err(e) => warn!("Forecast cache lookup failed for station {}: {}", station_id, e),
            }
        }

        let forecast = match self.fit_and_project(observations, horizon) {
            Ok(forecast) => forecast,
            Err(e) => {
                warn!("ARIMA failed for station {}: {}", station_id, e);
                StationForecast::failed(horizon, e.to_string())
            }
        };

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&key, &forecast) {
                warn!("Could not cache forecast for station {}: {}", station_id, e);
            }
        }
        forecast
    }

    fn fit_and_project(
        &self,
        observations: &[AqiObservation],
        horizon: usize,
    ) -> std::result::Result<StationForecast, ForecastError> {
        let options = FitOptions {
            min_observations: self.config.min_observations,
        };
        let mut model = Arima111::fit(observations, &options)?;

        let last_date = observations[observations.len() - 1].date;
        let lead = self.config.day_zero.lead_days(last_date);
        let mut projected = model.forecast(lead + horizon)?;
        let values = projected.split_off(lead);

        let first_date = last_date
            .succ_opt()
            .and_then(|d| d.checked_add_days(chrono::Days::new(lead as u64)));
        debug!(
            "Fitted phi={:?} theta={:?} aic={:?} on {} observations, day 0 = {:?} ({})",
            model.phi(),
            model.theta(),
            model.aic(),
            model.n_obs(),
            first_date,
            first_date.map_or(String::new(), |d| d.weekday().to_string())
        );
        Ok(StationForecast::fitted(values, first_date))
    }
}

/// Observations are cleaned at ingestion; a non-finite value here is a caller error
fn ensure_finite_history(station_id: &str, observations: &[AqiObservation]) -> Result<()> {
    match observations.iter().find(|o| !o.aqi.is_finite()) {
        Some(bad) => Err(PlannerError::InvalidObservation {
            station: station_id.to_string(),
            reason: format!("AQI {} on {}", bad.aqi, bad.date),
        }),
        None => Ok(()),
    }
}

/// Forecast with default settings and no memoization
pub fn forecast(stations: &[Station], history: &AqiHistory, horizon: usize) -> Result<ForecastSeries> {
    AqiForecaster::new(ForecastConfig::default()).forecast(stations, history, horizon)
}

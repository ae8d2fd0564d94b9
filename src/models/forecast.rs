//! Forecast series model: per-station predicted AQI values for the planning horizon

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Outcome of forecasting one station
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum ForecastStatus {
    /// Model fitted, every value present
    Fitted,
    /// Station had no usable history, nothing was fitted
    NoHistory,
    /// Fitting or projecting failed; values are all missing
    Failed { reason: String },
}

/// Predicted AQI values for one station.
///
/// `values` always has exactly `horizon` entries. `None` is the missing sentinel.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StationForecast {
    pub values: Vec<Option<f64>>,
    pub status: ForecastStatus,
    /// Calendar date of day 0, when the history carried dates
    pub first_date: Option<NaiveDate>,
}

impl StationForecast {
    /// A fully populated forecast
    #[must_use]
    pub fn fitted(values: Vec<f64>, first_date: Option<NaiveDate>) -> Self {
        Self {
            values: values.into_iter().map(Some).collect(),
            status: ForecastStatus::Fitted,
            first_date,
        }
    }

    /// `horizon` missing values for a station without history
    #[must_use]
    pub fn no_history(horizon: usize) -> Self {
        Self {
            values: vec![None; horizon],
            status: ForecastStatus::NoHistory,
            first_date: None,
        }
    }

    /// `horizon` missing values for a station whose model failed
    #[must_use]
    pub fn failed(horizon: usize, reason: impl Into<String>) -> Self {
        Self {
            values: vec![None; horizon],
            status: ForecastStatus::Failed {
                reason: reason.into(),
            },
            first_date: None,
        }
    }

    /// Value for a forecast day (0-based), `None` when missing or out of range
    #[must_use]
    pub fn value(&self, day: usize) -> Option<f64> {
        self.values.get(day).copied().flatten()
    }

    #[must_use]
    pub fn horizon(&self) -> usize {
        self.values.len()
    }
}

/// Forecasts for every station of a planning run
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ForecastSeries {
    horizon: usize,
    stations: BTreeMap<String, StationForecast>,
}

impl ForecastSeries {
    #[must_use]
    pub fn new(horizon: usize) -> Self {
        Self {
            horizon,
            stations: BTreeMap::new(),
        }
    }

    /// Build a series from plain values, one vector per station.
    ///
    /// Vectors shorter than `horizon` are padded with missing values, longer ones truncated.
    #[must_use]
    pub fn from_values<I, S>(horizon: usize, values: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut series = Self::new(horizon);
        for (station_id, mut station_values) in values {
            station_values.truncate(horizon);
            let mut forecast = StationForecast::fitted(station_values, None);
            forecast.values.resize(horizon, None);
            series.insert(station_id, forecast);
        }
        series
    }

    pub fn insert(&mut self, station_id: impl Into<String>, forecast: StationForecast) {
        self.stations.insert(station_id.into(), forecast);
    }

    #[must_use]
    pub fn get(&self, station_id: &str) -> Option<&StationForecast> {
        self.stations.get(station_id)
    }

    /// Forecast value for a station and day, `None` when missing
    #[must_use]
    pub fn value(&self, station_id: &str, day: usize) -> Option<f64> {
        self.get(station_id).and_then(|f| f.value(day))
    }

    #[must_use]
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Stations whose forecast failed, with the failure reason
    pub fn failures(&self) -> impl Iterator<Item = (&String, &str)> {
        self.stations.iter().filter_map(|(id, f)| match &f.status {
            ForecastStatus::Failed { reason } => Some((id, reason.as_str())),
            _ => None,
        })
    }
}

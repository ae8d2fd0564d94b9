//! Station and AQI history stores
//!
//! The planner only needs two lookups: stations by region prefix, and history by a
//! set of station ids. [`JsonDataset`] serves both from a local JSON file and does
//! the ingestion cleaning (date parsing, numeric coercion, dropping bad rows) before
//! anything reaches the core.

use std::collections::HashSet;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::models::{AqiHistory, AqiObservation, Station};
use crate::{PlannerError, Result};

/// Source of station metadata
pub trait StationStore {
    /// Stations whose id starts with `prefix`, in store order
    fn stations_in_region(&self, prefix: &str) -> Result<Vec<Station>>;
}

/// Source of historical AQI observations
pub trait AqiHistoryStore {
    /// Cleaned, date-sorted history for the given station ids
    fn history_for(&self, station_ids: &[String]) -> Result<AqiHistory>;

    /// Cleaned history for every station
    fn full_history(&self) -> Result<AqiHistory>;
}

#[derive(Debug, Deserialize)]
struct RawDataset {
    #[serde(default)]
    stations: Vec<RawStation>,
    #[serde(default)]
    aqi: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawStation {
    #[serde(rename = "StationId")]
    station_id: String,
    #[serde(rename = "StationName", default)]
    station_name: Option<String>,
    #[serde(rename = "Place", default)]
    place: Option<String>,
    #[serde(rename = "Latitude", default)]
    latitude: Value,
    #[serde(rename = "Longitude", default)]
    longitude: Value,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    #[serde(rename = "StationId")]
    station_id: String,
    #[serde(rename = "Date", default)]
    date: Value,
    #[serde(rename = "AQI", default)]
    aqi: Value,
}

/// Rows dropped while loading a dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub stations_loaded: usize,
    pub observations_loaded: usize,
    pub duplicate_stations: usize,
    pub invalid_dates: usize,
    pub invalid_aqi: usize,
}

/// Stations and AQI history held in memory, loaded from JSON
#[derive(Debug, Clone, Default)]
pub struct JsonDataset {
    stations: Vec<Station>,
    history: AqiHistory,
    report: IngestReport,
}

impl JsonDataset {
    /// Load and clean a dataset file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading dataset from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        let dataset = Self::from_json_str(&text).map_err(|e| match e {
            PlannerError::Dataset { message } => {
                PlannerError::dataset(format!("{}: {message}", path.display()))
            }
            other => other,
        })?;
        info!(
            "Loaded {} stations and {} observations from {}",
            dataset.report.stations_loaded,
            dataset.report.observations_loaded,
            path.display()
        );
        Ok(dataset)
    }

    /// Parse and clean a dataset from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: RawDataset = serde_json::from_str(text)
            .map_err(|e| PlannerError::dataset(format!("invalid dataset JSON: {e}")))?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawDataset) -> Self {
        let mut report = IngestReport::default();

        let mut seen = HashSet::new();
        let mut stations = Vec::with_capacity(raw.stations.len());
        for record in raw.stations {
            let id = record.station_id.trim().to_string();
            if !seen.insert(id.clone()) {
                warn!("Duplicate station {} in dataset, keeping the first record", id);
                report.duplicate_stations += 1;
                continue;
            }
            let name = [record.place, record.station_name]
                .into_iter()
                .flatten()
                .map(|n| n.trim().to_string())
                .find(|n| !n.is_empty())
                .unwrap_or_else(|| id.clone());
            // unusable coordinates are kept as NaN and rejected by the distance builder
            let latitude = coerce_number(&record.latitude).unwrap_or(f64::NAN);
            let longitude = coerce_number(&record.longitude).unwrap_or(f64::NAN);
            stations.push(Station::new(id, name, latitude, longitude));
        }

        let mut history = AqiHistory::new();
        for record in raw.aqi {
            let Some(date) = parse_date(&record.date) else {
                report.invalid_dates += 1;
                continue;
            };
            let Some(aqi) = coerce_number(&record.aqi) else {
                report.invalid_aqi += 1;
                continue;
            };
            history.push(record.station_id.trim(), AqiObservation::new(date, aqi));
            report.observations_loaded += 1;
        }
        history.sort();

        report.stations_loaded = stations.len();
        if report.invalid_dates + report.invalid_aqi > 0 {
            warn!(
                "Dropped {} rows with unparseable dates and {} rows without a numeric AQI",
                report.invalid_dates, report.invalid_aqi
            );
        }

        Self {
            stations,
            history,
            report,
        }
    }

    #[must_use]
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    #[must_use]
    pub fn history(&self) -> &AqiHistory {
        &self.history
    }

    /// What the cleaning step dropped
    #[must_use]
    pub fn report(&self) -> IngestReport {
        self.report
    }
}

impl StationStore for JsonDataset {
    fn stations_in_region(&self, prefix: &str) -> Result<Vec<Station>> {
        Ok(self
            .stations
            .iter()
            .filter(|s| s.id.starts_with(prefix))
            .cloned()
            .collect())
    }
}

impl AqiHistoryStore for JsonDataset {
    fn history_for(&self, station_ids: &[String]) -> Result<AqiHistory> {
        let mut history = AqiHistory::new();
        for id in station_ids {
            let series = self.history.series(id);
            if !series.is_empty() {
                history.insert(id.clone(), series.to_vec());
            }
        }
        Ok(history)
    }

    fn full_history(&self) -> Result<AqiHistory> {
        Ok(self.history.clone())
    }
}

/// Numbers and numeric strings become `f64`; anything else, or a non-finite result, is `None`
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

//! Historical AQI observations grouped per station

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily AQI reading
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct AqiObservation {
    pub date: NaiveDate,
    pub aqi: f64,
}

impl AqiObservation {
    #[must_use]
    pub fn new(date: NaiveDate, aqi: f64) -> Self {
        Self { date, aqi }
    }
}

/// Chronologically ordered AQI series, keyed by station id
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct AqiHistory {
    series: BTreeMap<String, Vec<AqiObservation>>,
}

impl AqiHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation; series are re-sorted by [`AqiHistory::sort`]
    pub fn push(&mut self, station_id: impl Into<String>, observation: AqiObservation) {
        self.series
            .entry(station_id.into())
            .or_default()
            .push(observation);
    }

    /// Replace a station's series. The series is sorted by date.
    pub fn insert(&mut self, station_id: impl Into<String>, mut observations: Vec<AqiObservation>) {
        observations.sort_by_key(|o| o.date);
        self.series.insert(station_id.into(), observations);
    }

    /// Sort every series by date. Same-day readings keep their load order.
    pub fn sort(&mut self) {
        for observations in self.series.values_mut() {
            observations.sort_by_key(|o| o.date);
        }
    }

    /// Observations for a station, empty if it has none
    #[must_use]
    pub fn series(&self, station_id: &str) -> &[AqiObservation] {
        self.series.get(station_id).map_or(&[], Vec::as_slice)
    }

    /// Just the AQI values for a station, in date order
    #[must_use]
    pub fn values(&self, station_id: &str) -> Vec<f64> {
        self.series(station_id).iter().map(|o| o.aqi).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<AqiObservation>)> {
        self.series.iter()
    }

    /// Number of stations with at least one entry
    #[must_use]
    pub fn station_count(&self) -> usize {
        self.series.len()
    }

    #[must_use]
    pub fn observation_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observation_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    #[test]
    fn test_sorted_on_insert() {
        let mut history = AqiHistory::new();
        history.insert(
            "DL001",
            vec![
                AqiObservation::new(day(3), 30.0),
                AqiObservation::new(day(1), 10.0),
                AqiObservation::new(day(2), 20.0),
            ],
        );
        assert_eq!(history.values("DL001"), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_push_then_sort_is_stable() {
        let mut history = AqiHistory::new();
        history.push("DL001", AqiObservation::new(day(2), 1.0));
        history.push("DL001", AqiObservation::new(day(1), 2.0));
        history.push("DL001", AqiObservation::new(day(2), 3.0));
        history.sort();
        assert_eq!(history.values("DL001"), vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_missing_station_is_empty() {
        let history = AqiHistory::new();
        assert!(history.series("XX001").is_empty());
        assert!(history.is_empty());
        assert_eq!(history.station_count(), 0);
    }
}

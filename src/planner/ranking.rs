//! Station ranking by forecast AQI

use serde::Serialize;

use crate::models::{ForecastSeries, Station};

/// A station paired with the AQI it is ranked by
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationAqi {
    pub station: Station,
    /// `None` when no forecast was available
    pub aqi: Option<f64>,
}

impl StationAqi {
    #[must_use]
    pub fn new(station: Station, aqi: Option<f64>) -> Self {
        Self { station, aqi }
    }
}

/// Sort ascending by AQI (cleanest first).
///
/// The sort is stable: equal values keep their input order. Stations without a value
/// go last, also in input order.
#[must_use]
pub fn rank_by_current_aqi(stations: &[StationAqi]) -> Vec<StationAqi> {
    let (mut ranked, missing): (Vec<_>, Vec<_>) = stations
        .iter()
        .cloned()
        .partition(|s| s.aqi.is_some_and(f64::is_finite));
    ranked.sort_by(|a, b| {
        let a = a.aqi.unwrap_or(f64::INFINITY);
        let b = b.aqi.unwrap_or(f64::INFINITY);
        a.total_cmp(&b)
    });
    ranked.extend(missing);
    ranked
}

/// Rank stations by their forecast for `day` (0-based)
#[must_use]
pub fn rank_by_forecast_day(
    stations: &[Station],
    forecasts: &ForecastSeries,
    day: usize,
) -> Vec<StationAqi> {
    let with_aqi: Vec<StationAqi> = stations
        .iter()
        .map(|s| StationAqi::new(s.clone(), forecasts.value(&s.id, day)))
        .collect();
    rank_by_current_aqi(&with_aqi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(id: &str, aqi: Option<f64>) -> StationAqi {
        StationAqi::new(Station::new(id, id, 10.0, 10.0), aqi)
    }

    fn ids(ranking: &[StationAqi]) -> Vec<&str> {
        ranking.iter().map(|s| s.station.id.as_str()).collect()
    }

    #[test]
    fn test_ascending_with_stable_ties() {
        let ranking = rank_by_current_aqi(&[
            entry("A", Some(80.0)),
            entry("B", Some(40.0)),
            entry("C", Some(80.0)),
            entry("D", Some(40.0)),
        ]);
        assert_eq!(ids(&ranking), vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn test_missing_values_last_in_input_order() {
        let ranking = rank_by_current_aqi(&[
            entry("A", None),
            entry("B", Some(120.0)),
            entry("C", Some(f64::NAN)),
            entry("D", Some(60.0)),
        ]);
        assert_eq!(ids(&ranking), vec!["D", "B", "A", "C"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_by_current_aqi(&[]).is_empty());
    }

    #[test]
    fn test_rank_by_forecast_day() {
        let stations = vec![
            Station::new("A", "A", 0.0, 0.0),
            Station::new("B", "B", 0.0, 1.0),
            Station::new("C", "C", 1.0, 0.0),
        ];
        let forecasts = ForecastSeries::from_values(
            2,
            [("A", vec![10.0, 12.0]), ("B", vec![50.0, 5.0]), ("C", vec![20.0, 20.0])],
        );
        assert_eq!(ids(&rank_by_forecast_day(&stations, &forecasts, 0)), vec!["A", "C", "B"]);
        assert_eq!(ids(&rank_by_forecast_day(&stations, &forecasts, 1)), vec!["B", "A", "C"]);
    }

    proptest! {
        #[test]
        fn prop_ranking_is_sorted_and_stable(values in prop::collection::vec(prop::option::of(0u8..5), 0..30)) {
            let input: Vec<StationAqi> = values
                .iter()
                .enumerate()
                .map(|(i, v)| entry(&format!("S{i:02}"), v.map(f64::from)))
                .collect();
            let ranking = rank_by_current_aqi(&input);
            prop_assert_eq!(ranking.len(), input.len());

            for pair in ranking.windows(2) {
                match (pair[0].aqi, pair[1].aqi) {
                    (Some(a), Some(b)) => {
                        prop_assert!(a <= b);
                        // ids encode input position
                        if a == b {
                            prop_assert!(pair[0].station.id < pair[1].station.id);
                        }
                    }
                    (None, Some(_)) => prop_assert!(false, "missing value ranked before a present one"),
                    (None, None) => prop_assert!(pair[0].station.id < pair[1].station.id),
                    (Some(_), None) => {}
                }
            }
        }
    }
}

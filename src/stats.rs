//! Regional AQI statistics: monthly means and per-region means

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::models::AqiHistory;
use crate::models::station::region_code_of;

/// Mean AQI for one calendar month, pooled over all years
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyAverage {
    /// 1 = January
    pub month: u32,
    pub mean_aqi: f64,
    pub observations: usize,
}

/// Monthly means for a region plus the month(s) with the highest mean
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    pub region_code: String,
    pub months: Vec<MonthlyAverage>,
    pub peak_months: Vec<u32>,
}

/// Mean AQI over every observation of one region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionAverage {
    pub region_code: String,
    pub mean_aqi: f64,
    pub observations: usize,
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Monthly mean AQI of all stations whose id starts with `region_code`.
///
/// Months without observations are left out. `peak_months` holds every month sharing
/// the highest mean, in calendar order.
#[must_use]
pub fn monthly_averages(history: &AqiHistory, region_code: &str) -> MonthlyReport {
    let mut by_month: BTreeMap<u32, Accumulator> = BTreeMap::new();
    for (station_id, observations) in history.iter() {
        if !station_id.starts_with(region_code) {
            continue;
        }
        for observation in observations {
            by_month
                .entry(observation.date.month())
                .or_default()
                .add(observation.aqi);
        }
    }

    let months: Vec<MonthlyAverage> = by_month
        .into_iter()
        .map(|(month, acc)| MonthlyAverage {
            month,
            mean_aqi: acc.mean(),
            observations: acc.count,
        })
        .collect();

    let peak = months
        .iter()
        .map(|m| m.mean_aqi)
        .fold(f64::NEG_INFINITY, f64::max);
    let peak_months = months
        .iter()
        .filter(|m| m.mean_aqi == peak)
        .map(|m| m.month)
        .collect();

    MonthlyReport {
        region_code: region_code.to_string(),
        months,
        peak_months,
    }
}

/// Mean AQI per region code, lowest first
#[must_use]
pub fn region_averages(history: &AqiHistory) -> Vec<RegionAverage> {
    let mut by_region: BTreeMap<String, Accumulator> = BTreeMap::new();
    for (station_id, observations) in history.iter() {
        let acc = by_region.entry(region_code_of(station_id)).or_default();
        for observation in observations {
            acc.add(observation.aqi);
        }
    }

    let mut averages: Vec<RegionAverage> = by_region
        .into_iter()
        .filter(|(_, acc)| acc.count > 0)
        .map(|(region_code, acc)| RegionAverage {
            region_code,
            mean_aqi: acc.mean(),
            observations: acc.count,
        })
        .collect();
    averages.sort_by(|a, b| a.mean_aqi.total_cmp(&b.mean_aqi));
    averages
}

/// Region with the highest mean AQI; the first in code order wins a tie
#[must_use]
pub fn highest_region(history: &AqiHistory) -> Option<RegionAverage> {
    let mut averages = region_averages(history);
    averages.sort_by(|a, b| {
        b.mean_aqi
            .total_cmp(&a.mean_aqi)
            .then_with(|| a.region_code.cmp(&b.region_code))
    });
    averages.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AqiObservation;
    use chrono::NaiveDate;

    fn obs(y: i32, m: u32, d: u32, aqi: f64) -> AqiObservation {
        AqiObservation::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), aqi)
    }

    fn history() -> AqiHistory {
        let mut history = AqiHistory::new();
        history.insert(
            "DL001",
            vec![obs(2020, 1, 1, 300.0), obs(2020, 1, 2, 200.0), obs(2020, 6, 1, 100.0)],
        );
        history.insert("DL002", vec![obs(2021, 11, 5, 250.0), obs(2021, 6, 2, 80.0)]);
        history.insert("KA001", vec![obs(2020, 1, 1, 50.0), obs(2020, 2, 1, 70.0)]);
        history
    }

    #[test]
    fn test_monthly_averages_with_ties() {
        let report = monthly_averages(&history(), "DL");
        let months: Vec<_> = report.months.iter().map(|m| (m.month, m.mean_aqi)).collect();
        assert_eq!(months, vec![(1, 250.0), (6, 90.0), (11, 250.0)]);
        assert_eq!(report.peak_months, vec![1, 11]);
        assert_eq!(report.months[0].observations, 2);
    }

    #[test]
    fn test_monthly_averages_unknown_region() {
        let report = monthly_averages(&history(), "ZZ");
        assert!(report.months.is_empty());
        assert!(report.peak_months.is_empty());
    }

    #[test]
    fn test_region_averages() {
        let averages = region_averages(&history());
        let codes: Vec<_> = averages.iter().map(|a| a.region_code.as_str()).collect();
        assert_eq!(codes, vec!["KA", "DL"]);
        assert_eq!(averages[0].mean_aqi, 60.0);
        assert_eq!(averages[1].mean_aqi, 186.0);

        let highest = highest_region(&history()).unwrap();
        assert_eq!(highest.region_code, "DL");
        assert!(highest_region(&AqiHistory::new()).is_none());
    }
}

//! Itinerary model: the day-by-day travel plan produced by the sequencer

use serde::{Deserialize, Serialize};

/// A station as it appears in a plan
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StopRef {
    pub id: String,
    pub name: String,
}

/// One day of the plan
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ItineraryStep {
    /// Day number, starting at 1
    pub day: usize,
    /// Where the traveller spends the day; absent on day 1
    pub origin: Option<StopRef>,
    /// Where the traveller goes next
    pub destination: StopRef,
    /// Distance travelled in km; absent on day 1
    pub distance_km: Option<f64>,
    /// Travel time in hours; absent on day 1
    pub travel_hours: Option<f64>,
    /// Forecast AQI at the destination for this day
    pub forecast_aqi: Option<f64>,
}

impl ItineraryStep {
    /// Narrative line for this step, e.g. for console output
    #[must_use]
    pub fn describe(&self) -> String {
        match (&self.origin, self.distance_km, self.travel_hours) {
            (Some(origin), Some(distance), Some(hours)) => format!(
                "Day {}: Spend the day exploring Place {}, and travel at night to Place {}.\n    Distance: {:.2} km, Travel Time: {:.2} hours.",
                self.day, origin.name, self.destination.name, distance, hours
            ),
            _ => format!(
                "Day {}: Start your journey at Place {}.",
                self.day, self.destination.name
            ),
        }
    }
}

/// Ordered, day-indexed plan
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Itinerary {
    pub steps: Vec<ItineraryStep>,
}

impl Itinerary {
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Destination station ids in visiting order
    #[must_use]
    pub fn destinations(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.destination.id.as_str()).collect()
    }

    /// Sum of all travelled distances in km
    #[must_use]
    pub fn total_distance_km(&self) -> f64 {
        self.steps.iter().filter_map(|s| s.distance_km).sum()
    }

    /// Sum of all travel times in hours
    #[must_use]
    pub fn total_travel_hours(&self) -> f64 {
        self.steps.iter().filter_map(|s| s.travel_hours).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: &str) -> StopRef {
        StopRef {
            id: id.to_string(),
            name: format!("Place {id}"),
        }
    }

    #[test]
    fn test_describe_first_and_later_days() {
        let first = ItineraryStep {
            day: 1,
            origin: None,
            destination: stop("C"),
            distance_km: None,
            travel_hours: None,
            forecast_aqi: Some(20.0),
        };
        assert_eq!(first.describe(), "Day 1: Start your journey at Place Place C.");

        let second = ItineraryStep {
            day: 2,
            origin: Some(stop("C")),
            destination: stop("B"),
            distance_km: Some(157.2),
            travel_hours: Some(3.144),
            forecast_aqi: Some(5.0),
        };
        let text = second.describe();
        assert!(text.starts_with("Day 2: Spend the day exploring Place Place C"));
        assert!(text.contains("Distance: 157.20 km, Travel Time: 3.14 hours."));
    }

    #[test]
    fn test_totals_skip_first_day() {
        let itinerary = Itinerary {
            steps: vec![
                ItineraryStep {
                    day: 1,
                    origin: None,
                    destination: stop("C"),
                    distance_km: None,
                    travel_hours: None,
                    forecast_aqi: None,
                },
                ItineraryStep {
                    day: 2,
                    origin: Some(stop("C")),
                    destination: stop("B"),
                    distance_km: Some(100.0),
                    travel_hours: Some(2.0),
                    forecast_aqi: None,
                },
            ],
        };
        assert_eq!(itinerary.total_distance_km(), 100.0);
        assert_eq!(itinerary.total_travel_hours(), 2.0);
        assert_eq!(itinerary.destinations(), vec!["C", "B"]);
    }
}

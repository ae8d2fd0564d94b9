//! Greedy day-by-day itinerary sequencing
//!
//! Each day the traveller moves from the current station to the unvisited station
//! with the lowest `forecast AQI + distance km`. The walk is myopic on purpose: it
//! never looks past the current day.

use serde::Serialize;
use tracing::{debug, info};

use super::distance::DistanceMatrix;
use crate::config::ItineraryConfig;
use crate::models::{ForecastSeries, Itinerary, ItineraryStep, Station, StopRef};
use crate::{PlannerError, Result};

/// Where the sequencer is in its walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SequencerState {
    /// Days remain and candidates were available so far
    Planning,
    /// A day found no unvisited candidate; no further steps are produced
    Exhausted,
}

/// Walks the horizon one day at a time
#[derive(Debug)]
pub struct ItinerarySequencer<'a> {
    stations: &'a [Station],
    distances: &'a DistanceMatrix,
    /// Per station, per day forecast; non-finite values already mapped to `None`
    forecasts: Vec<Vec<Option<f64>>>,
    horizon: usize,
    average_speed_kmh: f64,
    missing_forecast_penalty: Option<f64>,
    visited: Vec<bool>,
    current: usize,
    day: usize,
    state: SequencerState,
}

impl<'a> ItinerarySequencer<'a> {
    /// Check that stations, forecasts and distances line up, and prepare the walk
    pub fn new(
        stations: &'a [Station],
        forecasts: &ForecastSeries,
        distances: &'a DistanceMatrix,
        horizon: usize,
        config: &ItineraryConfig,
    ) -> Result<Self> {
        if stations.is_empty() {
            return Err(PlannerError::no_stations("cannot plan an itinerary without stations"));
        }
        if horizon == 0 {
            return Err(PlannerError::InvalidHorizon {
                horizon,
                message: "an itinerary needs at least one day".to_string(),
            });
        }
        if distances.size() != stations.len() {
            return Err(PlannerError::dimension_mismatch(format!(
                "distance matrix is {0}x{0} but there are {1} stations",
                distances.size(),
                stations.len()
            )));
        }

        let mut per_station = Vec::with_capacity(stations.len());
        for station in stations {
            let forecast = forecasts
                .get(&station.id)
                .ok_or_else(|| PlannerError::MissingForecast {
                    station: station.id.clone(),
                })?;
            if forecast.horizon() < horizon {
                return Err(PlannerError::dimension_mismatch(format!(
                    "forecast for station {} covers {} days, {} requested",
                    station.id,
                    forecast.horizon(),
                    horizon
                )));
            }
            per_station.push(
                forecast.values[..horizon]
                    .iter()
                    .map(|v| v.filter(|x| x.is_finite()))
                    .collect(),
            );
        }

        let speed = config.average_speed_kmh;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(PlannerError::config(format!(
                "average speed must be positive, got {speed}"
            )));
        }
        if config.start_index >= stations.len() {
            return Err(PlannerError::config(format!(
                "start index {} is out of range for {} stations",
                config.start_index,
                stations.len()
            )));
        }

        Ok(Self {
            stations,
            distances,
            forecasts: per_station,
            horizon,
            average_speed_kmh: speed,
            missing_forecast_penalty: config.missing_forecast_penalty,
            visited: vec![false; stations.len()],
            current: config.start_index,
            day: 0,
            state: SequencerState::Planning,
        })
    }

    #[must_use]
    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Days planned so far
    #[must_use]
    pub fn days_planned(&self) -> usize {
        self.day
    }

    /// Cost of moving to candidate `j` on the current day, `None` when not allowed
    fn cost(&self, j: usize) -> Option<f64> {
        if self.visited[j] {
            return None;
        }
        let aqi = self.forecasts[j][self.day].or(self.missing_forecast_penalty)?;
        Some(aqi + self.distances.get(self.current, j))
    }

    /// Plan the next day.
    ///
    /// Returns `Ok(None)` once the horizon is reached. Fails with
    /// [`PlannerError::ItineraryExhausted`] when no candidate is left, after which the
    /// sequencer stays exhausted.
    pub fn next_step(&mut self) -> Result<Option<ItineraryStep>> {
        if self.state == SequencerState::Exhausted {
            return Err(self.exhausted());
        }
        if self.day >= self.horizon {
            return Ok(None);
        }

        self.visited[self.current] = true;

        let mut best: Option<(usize, f64)> = None;
        for j in 0..self.stations.len() {
            if let Some(cost) = self.cost(j) {
                // strict comparison keeps the first index on ties
                if best.is_none_or(|(_, best_cost)| cost < best_cost) {
                    best = Some((j, cost));
                }
            }
        }

        let Some((next, cost)) = best else {
            self.state = SequencerState::Exhausted;
            return Err(self.exhausted());
        };

        let first_day = self.day == 0;
        let distance = self.distances.get(self.current, next);
        let step = ItineraryStep {
            day: self.day + 1,
            origin: (!first_day).then(|| stop_ref(&self.stations[self.current])),
            destination: stop_ref(&self.stations[next]),
            distance_km: (!first_day).then_some(distance),
            travel_hours: (!first_day).then_some(distance / self.average_speed_kmh),
            forecast_aqi: self.forecasts[next][self.day],
        };
        debug!(
            "Day {}: {} -> {} (cost {:.2})",
            step.day, self.stations[self.current].id, self.stations[next].id, cost
        );

        self.current = next;
        self.day += 1;
        Ok(Some(step))
    }

    /// Plan every remaining day
    pub fn run(mut self) -> Result<Itinerary> {
        let mut steps = Vec::with_capacity(self.horizon);
        while let Some(step) = self.next_step()? {
            steps.push(step);
        }
        let itinerary = Itinerary { steps };
        info!(
            "Planned {} days, {:.1} km in total",
            itinerary.len(),
            itinerary.total_distance_km()
        );
        Ok(itinerary)
    }

    fn exhausted(&self) -> PlannerError {
        PlannerError::ItineraryExhausted {
            day: self.day + 1,
            horizon: self.horizon,
            stations: self.stations.len(),
        }
    }
}

fn stop_ref(station: &Station) -> StopRef {
    StopRef {
        id: station.id.clone(),
        name: station.name.clone(),
    }
}

/// Plan `horizon` days with the default sequencer settings
pub fn plan_itinerary(
    stations: &[Station],
    forecasts: &ForecastSeries,
    distances: &DistanceMatrix,
    horizon: usize,
) -> Result<Itinerary> {
    plan_itinerary_with(stations, forecasts, distances, horizon, &ItineraryConfig::default())
}

/// Plan `horizon` days with explicit sequencer settings
pub fn plan_itinerary_with(
    stations: &[Station],
    forecasts: &ForecastSeries,
    distances: &DistanceMatrix,
    horizon: usize,
    config: &ItineraryConfig,
) -> Result<Itinerary> {
    ItinerarySequencer::new(stations, forecasts, distances, horizon, config)?.run()
}

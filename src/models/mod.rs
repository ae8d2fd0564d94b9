//! Data models for the AQI planner
//!
//! This module contains the core domain models organized by concern:
//! - Station: identity and geographic position of a monitoring station
//! - History: observed daily AQI per station
//! - Forecast: predicted AQI per station for the planning horizon
//! - Itinerary: the day-by-day travel plan

pub mod forecast;
pub mod history;
pub mod itinerary;
pub mod station;

// Re-export all public types for convenient access
pub use forecast::{ForecastSeries, ForecastStatus, StationForecast};
pub use history::{AqiHistory, AqiObservation};
pub use itinerary::{Itinerary, ItineraryStep, StopRef};
pub use station::{Coordinates, Station};

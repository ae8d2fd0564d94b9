//! `aqi-planner` - Air-quality-aware multi-day travel planning
//!
//! This library forecasts AQI per monitoring station, ranks stations by the
//! forecast and sequences a day-by-day itinerary that trades pollution exposure
//! against travel distance.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod planner;
pub mod region;
pub mod stats;
pub mod store;
pub mod travel_plan;

// Re-export core types for public API
pub use config::PlannerConfig;
pub use error::{ForecastError, PlannerError};
pub use models::{
    AqiHistory, AqiObservation, Coordinates, ForecastSeries, ForecastStatus, Itinerary,
    ItineraryStep, Station, StationForecast,
};
pub use planner::{
    AqiForecaster, DayZero, DistanceMatrix, DistanceModel, StationAqi, distance_matrix, forecast,
    plan_itinerary, rank_by_current_aqi,
};
pub use region::Region;
pub use store::{AqiHistoryStore, JsonDataset, StationStore};
pub use travel_plan::{PlanReport, TravelPlanner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PlannerError>;

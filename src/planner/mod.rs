//! Forecast-and-sequence core
//!
//! - `distance`: pairwise station distances
//! - `arima`: ARIMA(1,1,1) estimation
//! - `forecast`: per-station forecasting with failure isolation
//! - `cache`: memoization of station forecasts
//! - `sequencer`: greedy day-by-day itinerary
//! - `ranking`: stations ordered by forecast AQI

pub mod arima;
pub mod cache;
pub mod distance;
pub mod forecast;
pub mod ranking;
pub mod sequencer;

pub use arima::{Arima111, FitOptions, MODEL_NAME};
pub use cache::{ForecastCache, ForecastCacheKey, MemoryForecastCache, PersistentForecastCache};
pub use distance::{DistanceMatrix, DistanceModel, distance_matrix};
pub use forecast::{AqiForecaster, DayZero, forecast};
pub use ranking::{StationAqi, rank_by_current_aqi, rank_by_forecast_day};
pub use sequencer::{ItinerarySequencer, SequencerState, plan_itinerary, plan_itinerary_with};

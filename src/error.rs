//! Error types and handling for the AQI planner

use thiserror::Error;

/// Main error type for planning runs
#[derive(Error, Debug)]
pub enum PlannerError {
    /// A station's coordinate cannot be used for distance computation
    #[error("Invalid coordinate for station {station}: ({latitude}, {longitude})")]
    InvalidCoordinate {
        station: String,
        latitude: f64,
        longitude: f64,
    },

    /// An AQI observation reached the core in an unusable state
    #[error("Invalid observation for station {station}: {reason}")]
    InvalidObservation { station: String, reason: String },

    /// The selected region has no stations, or an empty list was passed in
    #[error("No stations available: {message}")]
    NoStations { message: String },

    /// Region name or code could not be resolved
    #[error("Unknown region: {input}")]
    UnknownRegion { input: String },

    /// Requested forecast horizon is not usable
    #[error("Invalid horizon {horizon}: {message}")]
    InvalidHorizon { horizon: usize, message: String },

    /// Station list, forecasts and distance matrix disagree in shape
    #[error("Dimension mismatch: {message}")]
    DimensionMismatch { message: String },

    /// A station has no entry in the forecast series
    #[error("No forecast for station {station}")]
    MissingForecast { station: String },

    /// Every remaining candidate was visited or unusable before the horizon was reached
    #[error(
        "Itinerary exhausted on day {day} of {horizon}: no unvisited station left among {stations}"
    )]
    ItineraryExhausted {
        day: usize,
        horizon: usize,
        stations: usize,
    },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Dataset loading and parsing errors
    #[error("Dataset error: {message}")]
    Dataset { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl PlannerError {
    /// Create a new "no stations" error
    pub fn no_stations<S: Into<String>>(message: S) -> Self {
        Self::NoStations {
            message: message.into(),
        }
    }

    /// Create a new dimension mismatch error
    pub fn dimension_mismatch<S: Into<String>>(message: S) -> Self {
        Self::DimensionMismatch {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        Self::Dataset {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Stable condition name, used in logs and CLI output
    #[must_use]
    pub fn condition(&self) -> &'static str {
        match self {
            PlannerError::InvalidCoordinate { .. } | PlannerError::InvalidObservation { .. } => {
                "DataQualityError"
            }
            PlannerError::NoStations { .. } => "NoStations",
            PlannerError::UnknownRegion { .. } => "UnknownRegion",
            PlannerError::InvalidHorizon { .. } => "InvalidHorizon",
            PlannerError::DimensionMismatch { .. } => "DimensionMismatch",
            PlannerError::MissingForecast { .. } => "MissingForecast",
            PlannerError::ItineraryExhausted { .. } => "ItineraryExhaustion",
            PlannerError::Config { .. } => "ConfigError",
            PlannerError::Dataset { .. } => "DatasetError",
            PlannerError::Cache { .. } => "CacheError",
            PlannerError::Io { .. } => "IoError",
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::InvalidObservation { station, reason } => {
                format!("Station {station} has an unusable AQI reading ({reason}). Please check the dataset.")
            }
            PlannerError::InvalidCoordinate { station, .. } => {
                format!("Station {station} has an unusable location. Please check the station data.")
            }
            PlannerError::NoStations { message } => format!("No stations to plan with: {message}"),
            PlannerError::UnknownRegion { input } => {
                format!("'{input}' is not a known state or region code.")
            }
            PlannerError::ItineraryExhausted { day, horizon, .. } => format!(
                "Only {} of {horizon} days could be planned: not enough stations with usable forecasts.",
                day.saturating_sub(1)
            ),
            PlannerError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            PlannerError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            PlannerError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Reasons a single station's model could not be fitted or projected.
///
/// These never abort a planning run; the forecaster turns them into missing values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("series is constant, nothing to fit")]
    ConstantSeries,

    #[error("non-finite value encountered: {0}")]
    NonFinite(String),

    #[error("model fit failed: {0}")]
    Model(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PlannerError::no_stations("region DL is empty");
        assert!(matches!(err, PlannerError::NoStations { .. }));

        let err = PlannerError::dimension_mismatch("3 stations, 2x2 matrix");
        assert!(matches!(err, PlannerError::DimensionMismatch { .. }));

        let err = PlannerError::config("bad speed");
        assert!(matches!(err, PlannerError::Config { .. }));
    }

    #[test]
    fn test_condition_names() {
        let err = PlannerError::ItineraryExhausted {
            day: 3,
            horizon: 5,
            stations: 3,
        };
        assert_eq!(err.condition(), "ItineraryExhaustion");

        let err = PlannerError::InvalidCoordinate {
            station: "DL001".to_string(),
            latitude: f64::NAN,
            longitude: 77.0,
        };
        assert_eq!(err.condition(), "DataQualityError");
    }

    #[test]
    fn test_user_messages() {
        let err = PlannerError::UnknownRegion {
            input: "Atlantis".to_string(),
        };
        assert!(err.user_message().contains("Atlantis"));

        let err = PlannerError::ItineraryExhausted {
            day: 3,
            horizon: 5,
            stations: 3,
        };
        assert!(err.user_message().contains("Only 2 of 5 days"));
    }

    #[test]
    fn test_invalid_observation_message() {
        let err = PlannerError::InvalidObservation {
            station: "DL004".to_string(),
            reason: "AQI NaN on 2020-03-02".to_string(),
        };
        assert_eq!(err.condition(), "DataQualityError");
        assert!(err.user_message().contains("DL004"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlannerError = io_err.into();
        assert!(matches!(err, PlannerError::Io { .. }));
    }

    #[test]
    fn test_forecast_error_display() {
        let err = ForecastError::InsufficientData {
            required: 3,
            actual: 1,
        };
        assert_eq!(err.to_string(), "need at least 3 observations, got 1");
    }
}

//! Configuration management for the AQI planner
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::PlannerError;
use crate::planner::{DayZero, DistanceModel};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the planner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Forecaster settings
    pub forecast: ForecastConfig,
    /// Itinerary sequencer settings
    pub itinerary: ItineraryConfig,
    /// Distance computation settings
    pub distance: DistanceConfig,
    /// Forecast cache settings
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Per-station ARIMA forecaster settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Shortest series a model is fitted to
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,
    /// Which calendar day forecast day 0 stands for
    #[serde(default)]
    pub day_zero: DayZero,
}

/// Greedy sequencer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryConfig {
    /// Average travel speed used to turn distance into travel time
    #[serde(default = "default_average_speed")]
    pub average_speed_kmh: f64,
    /// Position (in station-list order) of the implicit starting station
    #[serde(default)]
    pub start_index: usize,
    /// AQI charged for a day without a forecast; `None` skips such stations
    #[serde(default)]
    pub missing_forecast_penalty: Option<f64>,
}

/// Distance computation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistanceConfig {
    #[serde(default)]
    pub model: DistanceModel,
}

/// Forecast cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Memoize forecasts for identical inputs
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Keep forecasts on disk between runs
    #[serde(default)]
    pub persistent: bool,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
    /// Lifetime of on-disk entries
    #[serde(default = "default_cache_ttl")]
    pub ttl_hours: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_min_observations() -> usize {
    3
}

fn default_average_speed() -> f64 {
    50.0
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_location() -> String {
    "~/.cache/aqi-planner".to_string()
}

fn default_cache_ttl() -> u32 {
    24
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_observations: default_min_observations(),
            day_zero: DayZero::default(),
        }
    }
}

impl Default for ItineraryConfig {
    fn default() -> Self {
        Self {
            average_speed_kmh: default_average_speed(),
            start_index: 0,
            missing_forecast_penalty: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            persistent: false,
            location: default_cache_location(),
            ttl_hours: default_cache_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl CacheConfig {
    /// Cache directory with a leading `~` expanded to the home directory
    #[must_use]
    pub fn resolved_location(&self) -> PathBuf {
        match self.location.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(rest)),
            None => PathBuf::from(&self.location),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // e.g. AQI_PLANNER__ITINERARY__AVERAGE_SPEED_KMH=40
        builder = builder.add_source(
            Environment::with_prefix("AQI_PLANNER")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("aqi-planner").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.cache.ttl_hours == 0 {
            self.cache.ttl_hours = default_cache_ttl();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let speed = self.itinerary.average_speed_kmh;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(PlannerError::config(format!(
                "Average speed must be a positive number of km/h, got {speed}"
            ))
            .into());
        }

        if self.forecast.min_observations < 3 {
            return Err(PlannerError::config(
                "Forecast min_observations must be at least 3 for an ARIMA(1,1,1) fit",
            )
            .into());
        }

        if let Some(penalty) = self.itinerary.missing_forecast_penalty {
            if !penalty.is_finite() || penalty < 0.0 {
                return Err(PlannerError::config(
                    "Missing forecast penalty must be a non-negative number",
                )
                .into());
            }
        }

        if self.cache.ttl_hours > 168 {
            return Err(
                PlannerError::config("Cache TTL cannot exceed 168 hours (1 week)").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = PlannerConfig::default();
        assert_eq!(config.itinerary.average_speed_kmh, 50.0);
        assert_eq!(config.itinerary.start_index, 0);
        assert!(config.itinerary.missing_forecast_penalty.is_none());
        assert_eq!(config.forecast.min_observations, 3);
        assert_eq!(config.forecast.day_zero, DayZero::AfterLastObservation);
        assert_eq!(config.distance.model, DistanceModel::Geodesic);
        assert!(config.cache.enabled);
        assert!(!config.cache.persistent);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = PlannerConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_speed() {
        let mut config = PlannerConfig::default();
        config.itinerary.average_speed_kmh = 0.0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Average speed"));
    }

    #[test]
    fn test_config_validation_min_observations() {
        let mut config = PlannerConfig::default();
        config.forecast.min_observations = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_ttl() {
        let mut config = PlannerConfig::default();
        config.cache.ttl_hours = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Cache TTL"));
    }

    #[test]
    fn test_apply_defaults() {
        let mut config = PlannerConfig::default();
        config.logging.level = String::new();
        config.cache.ttl_hours = 0;
        config.apply_defaults();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.cache.ttl_hours, 24);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[itinerary]\naverage_speed_kmh = 40.0\nmissing_forecast_penalty = 500.0\n\n[distance]\nmodel = \"haversine\"\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = PlannerConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.itinerary.average_speed_kmh, 40.0);
        assert_eq!(config.itinerary.missing_forecast_penalty, Some(500.0));
        assert_eq!(config.distance.model, DistanceModel::Haversine);
        assert_eq!(config.logging.level, "debug");
        // untouched sections keep their defaults
        assert_eq!(config.forecast.min_observations, 3);
    }

    #[test]
    fn test_resolved_cache_location() {
        let mut cache = CacheConfig::default();
        cache.location = "/tmp/aqi".to_string();
        assert_eq!(cache.resolved_location(), PathBuf::from("/tmp/aqi"));

        cache.location = "~/aqi".to_string();
        assert!(cache.resolved_location().ends_with("aqi"));
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = PlannerConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("aqi-planner"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}

//! ARIMA(1,1,1) fitting and projection
//!
//! The estimation itself is `anofox_forecast`'s ARIMA. This module rejects the
//! series the planner treats as per-station failures before they reach it, and
//! turns the crate's errors into [`ForecastError`]s.

use std::fmt::Display;

use anofox_forecast::core::TimeSeries;
use anofox_forecast::models::Forecaster;
use anofox_forecast::models::arima::ARIMA;
use chrono::NaiveTime;

use crate::error::ForecastError;
use crate::models::AqiObservation;

/// Model label, used in cache keys and logs
pub const MODEL_NAME: &str = "ARIMA(1,1,1)";

/// Limits applied before fitting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitOptions {
    /// Shortest accepted series (never below 3)
    pub min_observations: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            min_observations: 3,
        }
    }
}

/// A fitted ARIMA(1,1,1) model, ready to project
#[derive(Debug)]
pub struct Arima111 {
    model: ARIMA,
    n_obs: usize,
}

impl Arima111 {
    /// Fit the model to a date-sorted series
    pub fn fit(
        observations: &[AqiObservation],
        options: &FitOptions,
    ) -> Result<Self, ForecastError> {
        let required = options.min_observations.max(3);
        if observations.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                actual: observations.len(),
            });
        }
        if let Some(bad) = observations.iter().find(|o| !o.aqi.is_finite()) {
            return Err(ForecastError::NonFinite(format!(
                "observation {} on {}",
                bad.aqi, bad.date
            )));
        }
        let first = observations[0].aqi;
        if observations.iter().all(|o| o.aqi == first) {
            return Err(ForecastError::ConstantSeries);
        }

        let timestamps = observations
            .iter()
            .map(|o| o.date.and_time(NaiveTime::MIN).and_utc())
            .collect();
        let values = observations.iter().map(|o| o.aqi).collect();
        let series = TimeSeries::univariate(timestamps, values).map_err(model_error)?;

        let mut model = ARIMA::new(1, 1, 1);
        model.fit(&series).map_err(model_error)?;

        Ok(Self {
            model,
            n_obs: observations.len(),
        })
    }

    /// Project `steps` values beyond the last observation
    pub fn forecast(&mut self, steps: usize) -> Result<Vec<f64>, ForecastError> {
        if steps == 0 {
            return Ok(Vec::new());
        }
        let projected = self.model.predict(steps).map_err(model_error)?;
        let values = projected.primary().to_vec();
        if values.len() != steps {
            return Err(ForecastError::Model(format!(
                "expected {steps} projected values, got {}",
                values.len()
            )));
        }
        if let Some(step) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::NonFinite(format!("forecast step {}", step + 1)));
        }
        Ok(values)
    }

    /// Autoregressive coefficient
    #[must_use]
    pub fn phi(&self) -> Option<f64> {
        self.model.ar_coefficients().first().copied()
    }

    /// Moving-average coefficient
    #[must_use]
    pub fn theta(&self) -> Option<f64> {
        self.model.ma_coefficients().first().copied()
    }

    #[must_use]
    pub fn aic(&self) -> Option<f64> {
        self.model.aic()
    }

    /// Number of observations the model was fitted to
    #[must_use]
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }
}

fn model_error(err: impl Display) -> ForecastError {
    ForecastError::Model(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn observations(values: &[f64]) -> Vec<AqiObservation> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| AqiObservation::new(start + chrono::Duration::days(i as i64), *v))
            .collect()
    }

    fn noisy_series(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| {
                let seasonal = 8.0 * (i as f64 * 0.3).sin();
                let noise = ((i * 17 + 7) % 13) as f64 - 6.0;
                120.0 + seasonal + noise
            })
            .collect()
    }

    #[rstest]
    #[case(vec![], 0)]
    #[case(vec![42.0], 1)]
    #[case(vec![42.0, 43.0], 2)]
    fn test_short_series_rejected(#[case] series: Vec<f64>, #[case] actual: usize) {
        let err = Arima111::fit(&observations(&series), &FitOptions::default()).unwrap_err();
        assert_eq!(err, ForecastError::InsufficientData { required: 3, actual });
    }

    #[test]
    fn test_min_observations_raises_requirement() {
        let options = FitOptions {
            min_observations: 40,
        };
        let err = Arima111::fit(&observations(&noisy_series(30)), &options).unwrap_err();
        assert_eq!(err, ForecastError::InsufficientData { required: 40, actual: 30 });
    }

    #[test]
    fn test_constant_series_rejected() {
        let err = Arima111::fit(&observations(&[80.0; 30]), &FitOptions::default()).unwrap_err();
        assert_eq!(err, ForecastError::ConstantSeries);
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = Arima111::fit(&observations(&[1.0, f64::NAN, 3.0, 4.0]), &FitOptions::default())
            .unwrap_err();
        assert!(matches!(err, ForecastError::NonFinite(_)));
    }

    #[test]
    fn test_noisy_series_forecast_is_plausible() {
        let series = observations(&noisy_series(120));
        let mut model = Arima111::fit(&series, &FitOptions::default()).unwrap();
        assert_eq!(model.n_obs(), 120);

        let forecast = model.forecast(10).unwrap();
        assert_eq!(forecast.len(), 10);
        for value in forecast {
            assert!(value.is_finite());
            assert!((0.0..=300.0).contains(&value), "implausible forecast {value}");
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let series = observations(&noisy_series(60));
        let mut a = Arima111::fit(&series, &FitOptions::default()).unwrap();
        let mut b = Arima111::fit(&series, &FitOptions::default()).unwrap();
        assert_eq!(a.phi(), b.phi());
        assert_eq!(a.forecast(5).unwrap(), b.forecast(5).unwrap());
    }

    #[test]
    fn test_zero_steps_forecast() {
        let series = observations(&noisy_series(30));
        let mut model = Arima111::fit(&series, &FitOptions::default()).unwrap();
        assert!(model.forecast(0).unwrap().is_empty());
    }
}

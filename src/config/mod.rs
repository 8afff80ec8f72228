//! Configuration module for the water futures forecaster.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Predictor, Forecast, and Observability.

mod forecast_config;
mod observability_config;
mod predictor_config;

pub use forecast_config::ForecastEnvConfig;
pub use observability_config::{LogFormat, ObservabilityEnvConfig};
pub use predictor_config::PredictorEnvConfig;

use anyhow::{Context, Result};

/// Main application configuration.
///
/// Aggregates the sub-configs; each is loaded and validated independently.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub predictor: PredictorEnvConfig,
    pub forecast: ForecastEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let predictor = PredictorEnvConfig::from_env().context("Failed to load predictor config")?;
        let forecast = ForecastEnvConfig::from_env().context("Failed to load forecast config")?;
        let observability =
            ObservabilityEnvConfig::from_env().context("Failed to load observability config")?;

        Ok(Self {
            predictor,
            forecast,
            observability,
        })
    }
}

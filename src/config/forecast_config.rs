//! Forecast pipeline configuration parsing from environment variables.
//!
//! Covers the horizon, the tracked contracts, the history source and the
//! fallback policy used when the hosted model is unavailable.

use crate::application::ml::feature_builder::FULL_HISTORY_LEN;
use anyhow::{Context, Result, bail};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_CONTRACTS: &str = "NQH25,NQM25,NQU25,NQZ25";
pub const DEFAULT_PRICE_HISTORY_CSV: &str = "data/water_futures_historical.csv";

/// Forecast environment configuration
#[derive(Debug, Clone)]
pub struct ForecastEnvConfig {
    pub horizon_days: u32,
    pub contracts: Vec<String>,
    pub history_window: usize,
    pub allow_fallback: bool,
    /// Fixed seed for horizon noise; entropy when unset
    pub noise_seed: Option<u64>,
    pub price_history_csv: PathBuf,
}

impl Default for ForecastEnvConfig {
    fn default() -> Self {
        Self {
            horizon_days: 7,
            contracts: parse_contracts(DEFAULT_CONTRACTS),
            history_window: 30,
            allow_fallback: true,
            noise_seed: None,
            price_history_csv: PathBuf::from(DEFAULT_PRICE_HISTORY_CSV),
        }
    }
}

impl ForecastEnvConfig {
    pub fn from_env() -> Result<Self> {
        let horizon_days = env::var("FORECAST_HORIZON_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse::<u32>()
            .context("Failed to parse FORECAST_HORIZON_DAYS")?;
        if horizon_days < 1 {
            bail!("FORECAST_HORIZON_DAYS must be at least 1");
        }

        let contracts = parse_contracts(
            &env::var("FORECAST_CONTRACTS").unwrap_or_else(|_| DEFAULT_CONTRACTS.to_string()),
        );
        if contracts.is_empty() {
            bail!("FORECAST_CONTRACTS must name at least one contract");
        }

        let history_window = env::var("FORECAST_HISTORY_WINDOW")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<usize>()
            .context("Failed to parse FORECAST_HISTORY_WINDOW")?;
        if history_window < FULL_HISTORY_LEN {
            bail!(
                "FORECAST_HISTORY_WINDOW must be at least {}, got {}",
                FULL_HISTORY_LEN,
                history_window
            );
        }

        let allow_fallback = env::var("FORECAST_ALLOW_FALLBACK")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .context("Failed to parse FORECAST_ALLOW_FALLBACK")?;

        let noise_seed = match env::var("FORECAST_NOISE_SEED") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<u64>()
                    .context("Failed to parse FORECAST_NOISE_SEED")?,
            ),
            _ => None,
        };

        let price_history_csv = env::var("PRICE_HISTORY_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PRICE_HISTORY_CSV));

        Ok(Self {
            horizon_days,
            contracts,
            history_window,
            allow_fallback,
            noise_seed,
            price_history_csv,
        })
    }
}

fn parse_contracts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

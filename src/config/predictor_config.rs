//! Hosted predictor configuration parsing from environment variables.

use anyhow::{Context, Result, bail};
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const MIN_TIMEOUT_SECS: u64 = 10;
pub const MAX_TIMEOUT_SECS: u64 = 30;

/// Hosted predictor environment configuration
#[derive(Debug, Clone)]
pub struct PredictorEnvConfig {
    /// `None` disables the hosted model
    pub endpoint_url: Option<Url>,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for PredictorEnvConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PredictorEnvConfig {
    pub fn from_env() -> Result<Self> {
        let endpoint_url = match env::var("PREDICTOR_ENDPOINT_URL") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                Url::parse(raw.trim())
                    .with_context(|| format!("Invalid PREDICTOR_ENDPOINT_URL: {}", raw))?,
            ),
            _ => None,
        };

        let api_token = env::var("PREDICTOR_API_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());

        let timeout_secs = env::var("PREDICTOR_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .context("Failed to parse PREDICTOR_TIMEOUT_SECS")?;

        let config = Self {
            endpoint_url,
            api_token,
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            bail!(
                "PREDICTOR_TIMEOUT_SECS must be between {} and {}, got {}",
                MIN_TIMEOUT_SECS,
                MAX_TIMEOUT_SECS,
                self.timeout_secs
            );
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint_url.is_some()
    }
}

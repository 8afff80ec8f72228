use super::envelope::{PredictRequest, parse_prediction_response};
use crate::config::PredictorEnvConfig;
use crate::domain::errors::ForecastError;
use crate::domain::forecast::PredictionResult;
use crate::domain::ml::feature_registry::FeatureVector;
use crate::domain::ports::PointPredictor;
use crate::infrastructure::core::HttpClientFactory;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Client for the managed NQH2O regression endpoint.
///
/// Each call is exactly one POST; transport errors, non-success statuses and
/// undecodable bodies all surface as `PredictionUnavailable`.
pub struct HostedPredictorClient {
    client: Client,
    endpoint: Url,
    api_token: Option<String>,
    timeout: Duration,
}

impl HostedPredictorClient {
    pub fn new(endpoint: Url, api_token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = HttpClientFactory::create_client(timeout)?;
        Ok(Self {
            client,
            endpoint,
            api_token: api_token.filter(|t| !t.is_empty()),
            timeout,
        })
    }

    /// Build from configuration; `None` when no endpoint is configured
    pub fn from_config(config: &PredictorEnvConfig) -> Result<Option<Self>> {
        let Some(endpoint) = config.endpoint_url.clone() else {
            return Ok(None);
        };
        let client = Self::new(endpoint, config.api_token.clone(), config.timeout())
            .context("Failed to create hosted predictor client")?;
        info!(
            "Hosted predictor configured at {} (timeout {:?})",
            client.endpoint, client.timeout
        );
        Ok(Some(client))
    }
}

#[async_trait]
impl PointPredictor for HostedPredictorClient {
    async fn predict(&self, features: &FeatureVector) -> Result<PredictionResult, ForecastError> {
        features.validate()?;

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&PredictRequest::new(features));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        debug!("Sending {} features to {}", features.len(), self.endpoint);
        let response = request.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                format!("request timed out after {:?}", self.timeout)
            } else {
                format!("request failed: {}", e)
            };
            warn!("Hosted predictor unreachable: {}", reason);
            ForecastError::prediction_unavailable(reason)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ForecastError::prediction_unavailable(format!("failed to read response: {}", e))
        })?;

        if !status.is_success() {
            warn!("Hosted predictor returned {}: {}", status, body);
            return Err(ForecastError::prediction_unavailable(format!(
                "endpoint returned status {}",
                status
            )));
        }

        let result = parse_prediction_response(&body)?;
        info!(
            "Hosted prediction: {:.2} (confidence {:.2}, {} individual models)",
            result.value,
            result.confidence,
            result.individual_predictions.len()
        );
        Ok(result)
    }

    fn name(&self) -> &str {
        "NQH2O Hosted Model"
    }
}

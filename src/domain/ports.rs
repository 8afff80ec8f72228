use crate::domain::drought::{BasinData, DroughtMetrics};
use crate::domain::errors::ForecastError;
use crate::domain::forecast::PredictionResult;
use crate::domain::market::price_history::PriceHistory;
use crate::domain::ml::feature_registry::FeatureVector;
use async_trait::async_trait;

/// Supplies ordered price history per contract
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    async fn price_history(&self, contract_code: &str) -> Result<PriceHistory, ForecastError>;
}

/// Supplies current drought conditions
#[async_trait]
pub trait DroughtDataSource: Send + Sync {
    async fn current_metrics(&self) -> Result<DroughtMetrics, ForecastError>;

    /// Basin-level readings; `None` means the model defaults apply
    async fn basin_data(&self) -> Result<Option<BasinData>, ForecastError> {
        Ok(None)
    }
}

/// Interface for the hosted point-prediction model
#[async_trait]
pub trait PointPredictor: Send + Sync {
    /// Predict the next-period price from a validated feature set
    async fn predict(&self, features: &FeatureVector) -> Result<PredictionResult, ForecastError>;

    /// Get model name/type
    fn name(&self) -> &str;
}

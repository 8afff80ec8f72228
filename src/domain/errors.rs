use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while producing a forecast or a trading signal
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("Insufficient price history: need {required} points, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("Invalid price history at index {index}: {value}")]
    InvalidPriceHistory { index: usize, value: f64 },

    #[error("Invalid drought metrics: {reason}")]
    InvalidDroughtMetrics { reason: String },

    #[error("Missing required feature: {name}")]
    MissingFeature { name: String },

    #[error("Unexpected feature: {name}")]
    UnexpectedFeature { name: String },

    #[error("Feature {name} is not finite: {value}")]
    NonFiniteFeature { name: String, value: f64 },

    #[error("Prediction unavailable: {reason}")]
    PredictionUnavailable { reason: String },

    #[error(
        "Ensemble inputs differ in length: model={model}, \
         moving_average={moving_average}, trend={trend}"
    )]
    EnsembleLengthMismatch {
        model: usize,
        moving_average: usize,
        trend: usize,
    },

    #[error("Price history unavailable for {contract_code}: {reason}")]
    PriceHistoryUnavailable {
        contract_code: String,
        reason: String,
    },

    #[error("Drought data unavailable: {reason}")]
    DroughtDataUnavailable { reason: String },
}

/// Pipeline stage in which a forecast request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastStage {
    History,
    DroughtData,
    Features,
    Prediction,
    Ensemble,
}

impl fmt::Display for ForecastStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::History => write!(f, "history"),
            Self::DroughtData => write!(f, "drought_data"),
            Self::Features => write!(f, "features"),
            Self::Prediction => write!(f, "prediction"),
            Self::Ensemble => write!(f, "ensemble"),
        }
    }
}

impl ForecastError {
    pub fn stage(&self) -> ForecastStage {
        match self {
            Self::PriceHistoryUnavailable { .. } | Self::InvalidPriceHistory { .. } => {
                ForecastStage::History
            }
            Self::DroughtDataUnavailable { .. } | Self::InvalidDroughtMetrics { .. } => {
                ForecastStage::DroughtData
            }
            Self::InsufficientHistory { .. }
            | Self::MissingFeature { .. }
            | Self::UnexpectedFeature { .. }
            | Self::NonFiniteFeature { .. } => ForecastStage::Features,
            Self::PredictionUnavailable { .. } => ForecastStage::Prediction,
            Self::EnsembleLengthMismatch { .. } => ForecastStage::Ensemble,
        }
    }

    pub fn prediction_unavailable(reason: impl Into<String>) -> Self {
        Self::PredictionUnavailable {
            reason: reason.into(),
        }
    }
}

/// User-visible failure record naming the stage that broke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastFailure {
    pub contract_code: String,
    pub stage: ForecastStage,
    pub message: String,
}

impl ForecastFailure {
    pub fn new(contract_code: &str, error: &ForecastError) -> Self {
        Self {
            contract_code: contract_code.to_string(),
            stage: error.stage(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_history_formatting() {
        let error = ForecastError::InsufficientHistory {
            required: 12,
            actual: 3,
        };

        let msg = error.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("got 3"));
        assert_eq!(error.stage(), ForecastStage::Features);
    }

    #[test]
    fn test_failure_names_stage() {
        let error = ForecastError::prediction_unavailable("connection refused");
        let failure = ForecastFailure::new("NQH25", &error);

        assert_eq!(failure.stage, ForecastStage::Prediction);
        assert!(failure.message.contains("connection refused"));

        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["stage"], "prediction");
        assert_eq!(json["contract_code"], "NQH25");
    }

    #[test]
    fn test_ensemble_mismatch_stage() {
        let error = ForecastError::EnsembleLengthMismatch {
            model: 3,
            moving_average: 2,
            trend: 3,
        };
        assert_eq!(error.stage(), ForecastStage::Ensemble);
        assert_eq!(
            error.to_string(),
            "Ensemble inputs differ in length: model=3, moving_average=2, trend=3"
        );
    }
}

use crate::domain::drought::{BasinData, DroughtMetrics};
use crate::domain::errors::ForecastError;
use crate::domain::forecast::PredictionResult;
use crate::domain::ml::feature_registry::FeatureVector;
use crate::domain::ports::{DroughtDataSource, PointPredictor};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Drought source returning fixed conditions (severe drought, drying trend).
/// Stands in until a drought-monitoring feed is wired up.
#[derive(Debug, Clone)]
pub struct SimulatedDroughtSource {
    metrics: DroughtMetrics,
    basin: Option<BasinData>,
}

impl SimulatedDroughtSource {
    pub fn new(metrics: DroughtMetrics, basin: Option<BasinData>) -> Self {
        Self { metrics, basin }
    }
}

impl Default for SimulatedDroughtSource {
    fn default() -> Self {
        Self {
            metrics: DroughtMetrics {
                spi: -1.5,
                spei: -1.2,
                pdsi: -2.0,
                severity: 2,
                trend_4w: -0.3,
                trend_8w: -0.5,
            },
            basin: None,
        }
    }
}

#[async_trait]
impl DroughtDataSource for SimulatedDroughtSource {
    async fn current_metrics(&self) -> Result<DroughtMetrics, ForecastError> {
        self.metrics.validate()?;
        Ok(self.metrics)
    }

    async fn basin_data(&self) -> Result<Option<BasinData>, ForecastError> {
        Ok(self.basin)
    }
}

/// Predictor with a scripted outcome, for tests and offline runs
pub struct MockPredictor {
    outcome: Result<PredictionResult, ForecastError>,
    calls: AtomicUsize,
    last_features: Mutex<Option<FeatureVector>>,
}

impl MockPredictor {
    pub fn returning(value: f64, confidence: f64) -> Self {
        Self::with_outcome(Ok(PredictionResult {
            value,
            confidence,
            individual_predictions: Default::default(),
        }))
    }

    pub fn failing(reason: &str) -> Self {
        Self::with_outcome(Err(ForecastError::prediction_unavailable(reason)))
    }

    pub fn with_outcome(outcome: Result<PredictionResult, ForecastError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_features: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn last_features(&self) -> Option<FeatureVector> {
        self.last_features
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl PointPredictor for MockPredictor {
    async fn predict(&self, features: &FeatureVector) -> Result<PredictionResult, ForecastError> {
        let count = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        if let Ok(mut last) = self.last_features.lock() {
            *last = Some(features.clone());
        }
        info!("MockPredictor: call #{} with {} features", count, features.len());
        self.outcome.clone()
    }

    fn name(&self) -> &str {
        "Mock Predictor"
    }
}

use crate::domain::errors::ForecastError;
use crate::domain::forecast::EnsembleWeights;

/// Fixed-weight blend of the hosted-model, moving-average and trend curves.
///
/// Weights are not adapted or fitted; the same weights apply to every day of
/// the horizon.
#[derive(Debug, Clone, Copy)]
pub struct EnsembleBlender {
    weights: EnsembleWeights,
}

impl Default for EnsembleBlender {
    fn default() -> Self {
        Self {
            weights: EnsembleWeights {
                hosted_model: 0.5,
                moving_average: 0.3,
                trend: 0.2,
            },
        }
    }
}

impl EnsembleBlender {
    pub fn with_weights(weights: EnsembleWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> EnsembleWeights {
        self.weights
    }

    /// Weights used without the hosted model: the two baseline weights
    /// renormalized in proportion (0.3/0.2 becomes 0.6/0.4)
    pub fn fallback_weights(&self) -> EnsembleWeights {
        let total = self.weights.moving_average + self.weights.trend;
        if total <= 0.0 {
            return EnsembleWeights {
                hosted_model: 0.0,
                moving_average: 0.5,
                trend: 0.5,
            };
        }
        EnsembleWeights {
            hosted_model: 0.0,
            moving_average: self.weights.moving_average / total,
            trend: self.weights.trend / total,
        }
    }

    pub fn blend(
        &self,
        model: &[f64],
        moving_average: &[f64],
        trend: &[f64],
    ) -> Result<Vec<f64>, ForecastError> {
        if model.len() != moving_average.len() || model.len() != trend.len() {
            return Err(ForecastError::EnsembleLengthMismatch {
                model: model.len(),
                moving_average: moving_average.len(),
                trend: trend.len(),
            });
        }

        let w = self.weights;
        Ok(model
            .iter()
            .zip(moving_average)
            .zip(trend)
            .map(|((m, ma), t)| m * w.hosted_model + ma * w.moving_average + t * w.trend)
            .collect())
    }

    /// Blend of the two local baselines only
    pub fn blend_fallback(
        &self,
        moving_average: &[f64],
        trend: &[f64],
    ) -> Result<Vec<f64>, ForecastError> {
        if moving_average.len() != trend.len() {
            return Err(ForecastError::EnsembleLengthMismatch {
                model: 0,
                moving_average: moving_average.len(),
                trend: trend.len(),
            });
        }

        let w = self.fallback_weights();
        Ok(moving_average
            .iter()
            .zip(trend)
            .map(|(ma, t)| ma * w.moving_average + t * w.trend)
            .collect())
    }
}

use crate::domain::forecast::ForecastPoint;
use chrono::{NaiveDate, TimeDelta};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Days covered by one hosted-model prediction
pub const PREDICTION_PERIOD_DAYS: f64 = 7.0;

/// Noise standard deviation per unit of drought severity per day of lookahead
pub const DEFAULT_NOISE_VARIANCE: f64 = 0.002;

/// Spreads a single next-period prediction over a multi-day horizon.
///
/// Day `d` moves linearly toward the prediction at `1/7` of the predicted
/// change per day, plus zero-mean Gaussian noise whose standard deviation
/// grows with both `d` and drought severity.
#[derive(Debug, Clone, Copy)]
pub struct HorizonExpander {
    variance_constant: f64,
}

impl Default for HorizonExpander {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_VARIANCE)
    }
}

impl HorizonExpander {
    pub fn new(variance_constant: f64) -> Self {
        Self {
            variance_constant: variance_constant.max(0.0),
        }
    }

    /// Expander without noise; output depends only on its inputs
    pub fn deterministic() -> Self {
        Self::new(0.0)
    }

    pub fn expand<R: Rng + ?Sized>(
        &self,
        base_prediction: f64,
        current_price: f64,
        horizon_days: u32,
        drought_severity: u8,
        start: NaiveDate,
        rng: &mut R,
    ) -> Vec<ForecastPoint> {
        let daily_rate = (base_prediction - current_price) / current_price / PREDICTION_PERIOD_DAYS;

        let mut curve = Vec::with_capacity(horizon_days as usize);
        for day in 1..=horizon_days {
            let mut price = current_price * (1.0 + daily_rate * day as f64);

            let sigma = self.variance_constant * drought_severity as f64 * day as f64;
            if sigma > 0.0 {
                if let Ok(normal) = Normal::new(0.0, sigma) {
                    price += normal.sample(rng);
                }
            }

            curve.push(ForecastPoint {
                date: start + TimeDelta::days(day as i64),
                price,
                day,
            });
        }
        curve
    }
}

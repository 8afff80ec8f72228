use crate::domain::errors::ForecastError;
use serde::{Deserialize, Serialize};

/// Ordered water-index prices, oldest first and most recent last.
///
/// Every price is finite and strictly positive, since momentum and
/// moving-average ratios divide by historical prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct PriceHistory {
    prices: Vec<f64>,
}

impl PriceHistory {
    pub fn new(prices: Vec<f64>) -> Result<Self, ForecastError> {
        if let Some((index, &value)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(ForecastError::InvalidPriceHistory { index, value });
        }
        Ok(Self { prices })
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.prices
    }

    pub fn latest(&self) -> Option<f64> {
        self.prices.last().copied()
    }

    /// Price `k` observations back, where `lag(1)` is the latest price
    pub fn lag(&self, k: usize) -> Option<f64> {
        if k == 0 || k > self.prices.len() {
            return None;
        }
        Some(self.prices[self.prices.len() - k])
    }

    /// Trailing window of at most `n` prices
    pub fn tail(&self, n: usize) -> &[f64] {
        let start = self.prices.len().saturating_sub(n);
        &self.prices[start..]
    }

    pub fn ensure_len(&self, required: usize) -> Result<(), ForecastError> {
        if self.prices.len() < required {
            return Err(ForecastError::InsufficientHistory {
                required,
                actual: self.prices.len(),
            });
        }
        Ok(())
    }
}

impl TryFrom<Vec<f64>> for PriceHistory {
    type Error = ForecastError;

    fn try_from(prices: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(prices)
    }
}

impl From<PriceHistory> for Vec<f64> {
    fn from(history: PriceHistory) -> Self {
        history.prices
    }
}

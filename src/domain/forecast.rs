use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One day of a forecast curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub price: f64,
    /// 1-based lookahead
    pub day: u32,
}

/// Mean price of a curve, `None` for an empty curve
pub fn curve_mean(curve: &[ForecastPoint]) -> Option<f64> {
    if curve.is_empty() {
        return None;
    }
    Some(curve.iter().map(|p| p.price).sum::<f64>() / curve.len() as f64)
}

/// Single next-period price returned by the hosted model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub value: f64,
    /// Model agreement in 0..1
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub individual_predictions: BTreeMap<String, f64>,
}

/// Which path produced a forecast curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastModel {
    Hosted,
    Fallback,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceIntervals {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl ConfidenceIntervals {
    /// Symmetric band of `price * (1 - confidence) * width` around each point
    pub fn around(curve: &[ForecastPoint], confidence: f64, width: f64) -> Self {
        let (lower, upper) = curve
            .iter()
            .map(|p| {
                let margin = p.price * (1.0 - confidence) * width;
                (p.price - margin, p.price + margin)
            })
            .unzip();
        Self { lower, upper }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketMomentum {
    Bullish,
    Bearish,
    Neutral,
}

impl MarketMomentum {
    /// Classifies the last price change; moves within $2 are neutral
    pub fn from_prices(prices: &[f64]) -> Self {
        match prices {
            [.., prev, last] => {
                let change = last - prev;
                if change > 2.0 {
                    Self::Bullish
                } else if change < -2.0 {
                    Self::Bearish
                } else {
                    Self::Neutral
                }
            }
            _ => Self::Neutral,
        }
    }
}

/// Explanatory context attached to a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastFactors {
    pub drought_severity: u8,
    pub drought_spi: f64,
    pub drought_impact_pct: f64,
    pub price_change: Option<f64>,
    pub price_change_pct: Option<f64>,
    pub market_momentum: MarketMomentum,
    pub history_anomalies: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub contract_code: String,
    pub current_price: f64,
    pub predicted_prices: Vec<ForecastPoint>,
    pub model_confidence: f64,
    pub confidence_intervals: ConfidenceIntervals,
    pub factors: ForecastFactors,
    pub model: ForecastModel,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleComponents {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted_model: Option<f64>,
    pub moving_average: f64,
    pub trend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsemblePoint {
    pub date: NaiveDate,
    pub price: f64,
    pub components: EnsembleComponents,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleWeights {
    pub hosted_model: f64,
    pub moving_average: f64,
    pub trend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleForecast {
    pub contract_code: String,
    pub ensemble_forecast: Vec<EnsemblePoint>,
    pub model_weights: EnsembleWeights,
    pub model: ForecastModel,
    pub confidence: f64,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, price: f64) -> ForecastPoint {
        ForecastPoint {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            price,
            day,
        }
    }

    #[test]
    fn test_curve_mean() {
        let curve = vec![point(1, 510.0), point(2, 515.0), point(3, 520.0)];
        assert_eq!(curve_mean(&curve), Some(515.0));
        assert_eq!(curve_mean(&[]), None);
    }

    #[test]
    fn test_intervals_are_symmetric() {
        let curve = vec![point(1, 400.0), point(2, 410.0)];
        let bands = ConfidenceIntervals::around(&curve, 0.8, 0.15);

        // margin = 400 * 0.2 * 0.15 = 12
        assert!((bands.lower[0] - 388.0).abs() < 1e-9);
        assert!((bands.upper[0] - 412.0).abs() < 1e-9);
        for (i, p) in curve.iter().enumerate() {
            assert!((p.price - bands.lower[i] - (bands.upper[i] - p.price)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_momentum_classification() {
        assert_eq!(MarketMomentum::from_prices(&[400.0, 403.0]), MarketMomentum::Bullish);
        assert_eq!(MarketMomentum::from_prices(&[400.0, 397.5]), MarketMomentum::Bearish);
        assert_eq!(MarketMomentum::from_prices(&[400.0, 401.0]), MarketMomentum::Neutral);
        assert_eq!(MarketMomentum::from_prices(&[400.0]), MarketMomentum::Neutral);
    }

    #[test]
    fn test_point_date_serializes_as_iso_day() {
        let json = serde_json::to_value(point(3, 402.86)).unwrap();
        assert_eq!(json["date"], "2025-01-03");
    }
}

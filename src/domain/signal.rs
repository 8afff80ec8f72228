use crate::domain::errors::ForecastFailure;
use crate::domain::forecast::ForecastModel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalStrength {
    Strong,
    Moderate,
    Weak,
}

impl fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strong => write!(f, "STRONG"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::Weak => write!(f, "WEAK"),
        }
    }
}

/// Per-contract recommendation derived from a forecast curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub contract_code: String,
    pub signal: SignalType,
    pub strength: SignalStrength,
    /// Fractional return of the curve mean over the current price
    pub expected_return: f64,
    pub confidence: f64,
    pub current_price: f64,
    pub target_price: f64,
    /// Human-readable basis for the call
    pub reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ForecastModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    pub signals: Vec<TradingSignal>,
    pub total_signals: usize,
    pub failures: Vec<ForecastFailure>,
    pub analysis_period_days: u32,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_serializes_uppercase() {
        let signal = TradingSignal {
            contract_code: "NQH25".to_string(),
            signal: SignalType::Buy,
            strength: SignalStrength::Moderate,
            expected_return: 0.03,
            confidence: 0.8,
            current_price: 500.0,
            target_price: 515.0,
            reasoning: "Based on 80% confidence forecast".to_string(),
            model: None,
        };

        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json["signal"], "BUY");
        assert_eq!(json["strength"], "MODERATE");
        assert_eq!(json["reasoning"], "Based on 80% confidence forecast");
        assert!(json.get("model").is_none());
        assert_eq!(SignalType::Hold.to_string(), "HOLD");
    }
}

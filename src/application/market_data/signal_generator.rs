use crate::domain::forecast::{ForecastModel, ForecastPoint, curve_mean};
use crate::domain::signal::{SignalStrength, SignalType, TradingSignal};
use tracing::debug;

/// Thresholds turning a forecast curve into a BUY/SELL/HOLD call
#[derive(Debug, Clone, Copy)]
pub struct SignalThresholds {
    /// Absolute expected return needed for a directional signal
    pub entry_return: f64,
    /// Absolute expected return for a STRONG signal
    pub strong_return: f64,
    /// Confidence that must be exceeded for a directional signal
    pub min_confidence: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            entry_return: 0.02,
            strong_return: 0.05,
            min_confidence: 0.7,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignalGenerator {
    thresholds: SignalThresholds,
}

impl SignalGenerator {
    pub fn new(thresholds: SignalThresholds) -> Self {
        Self { thresholds }
    }

    /// Stateless: identical inputs give identical signals
    pub fn generate_signal(
        &self,
        contract_code: &str,
        current_price: f64,
        curve: &[ForecastPoint],
        confidence: f64,
    ) -> TradingSignal {
        let target_price = curve_mean(curve).unwrap_or(current_price);
        let expected_return = (target_price - current_price) / current_price;
        let (signal, strength) = self.classify(expected_return, confidence);

        debug!(
            "{}: expected return {:.4} at confidence {:.2} -> {} {}",
            contract_code, expected_return, confidence, signal, strength
        );

        TradingSignal {
            contract_code: contract_code.to_string(),
            signal,
            strength,
            expected_return,
            confidence,
            current_price,
            target_price,
            reasoning: format!("Based on {:.0}% confidence forecast", confidence * 100.0),
            model: None,
        }
    }

    pub fn generate_for_model(
        &self,
        contract_code: &str,
        current_price: f64,
        curve: &[ForecastPoint],
        confidence: f64,
        model: ForecastModel,
    ) -> TradingSignal {
        TradingSignal {
            model: Some(model),
            ..self.generate_signal(contract_code, current_price, curve, confidence)
        }
    }

    fn classify(&self, expected_return: f64, confidence: f64) -> (SignalType, SignalStrength) {
        let t = &self.thresholds;
        let confident = confidence > t.min_confidence;

        if confident && expected_return > t.entry_return {
            let strength = if expected_return > t.strong_return {
                SignalStrength::Strong
            } else {
                SignalStrength::Moderate
            };
            (SignalType::Buy, strength)
        } else if confident && expected_return < -t.entry_return {
            let strength = if expected_return < -t.strong_return {
                SignalStrength::Strong
            } else {
                SignalStrength::Moderate
            };
            (SignalType::Sell, strength)
        } else {
            (SignalType::Hold, SignalStrength::Weak)
        }
    }
}

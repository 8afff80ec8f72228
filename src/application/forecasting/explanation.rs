use crate::domain::drought::DroughtMetrics;

/// Percent move beyond which a forecast is described as directional
const DIRECTIONAL_MOVE_PCT: f64 = 2.0;

/// Human-readable summary of a hosted-model prediction
pub fn explain_prediction(
    current_price: f64,
    predicted_price: f64,
    confidence: f64,
    drought: &DroughtMetrics,
) -> String {
    let change_pct = (predicted_price - current_price) / current_price * 100.0;

    let (direction, reason) = if change_pct > DIRECTIONAL_MOVE_PCT {
        ("increase", "worsening water scarcity")
    } else if change_pct < -DIRECTIONAL_MOVE_PCT {
        ("decrease", "improving water conditions")
    } else {
        ("remain stable", "steady drought conditions")
    };

    format!(
        "The NQH2O water index is forecasted to {} from ${:.2} to ${:.2} ({:+.1}%). \
         This forecast is based on {} conditions and has a confidence level of {:.0}%. \
         The prediction reflects {} in California's water markets.",
        direction,
        current_price,
        predicted_price,
        change_pct,
        drought.severity_label(),
        confidence * 100.0,
        reason
    )
}

/// Summary used when the curve comes from the local baselines only
pub fn explain_fallback(drought: &DroughtMetrics) -> String {
    format!(
        "Hosted model unavailable; forecast blends moving-average and trend baselines \
         under {} conditions.",
        drought.severity_label()
    )
}

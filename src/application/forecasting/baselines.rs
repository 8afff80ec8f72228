//! Local forecast heuristics that need no network access.
//!
//! These curves are blended with the hosted model in the ensemble, and carry
//! the forecast alone when the hosted model is unreachable.

use crate::domain::errors::ForecastError;
use crate::domain::market::price_history::PriceHistory;
use statrs::statistics::Statistics;

/// Trailing points averaged by the moving-average curve
pub const MOVING_AVERAGE_WINDOW: usize = 20;
/// Per-day drift added to the moving-average projection
pub const MOVING_AVERAGE_DAILY_DRIFT: f64 = 0.3;
/// Trailing points used to fit the trend line
pub const TREND_WINDOW: usize = 10;

/// `ma + drift * i` for i in 0..horizon, `ma` over the trailing
/// [`MOVING_AVERAGE_WINDOW`] points (fewer if the history is shorter)
pub fn moving_average_curve(
    prices: &PriceHistory,
    horizon_days: u32,
) -> Result<Vec<f64>, ForecastError> {
    prices.ensure_len(1)?;
    let ma = prices.tail(MOVING_AVERAGE_WINDOW).mean();

    Ok((0..horizon_days)
        .map(|i| ma + MOVING_AVERAGE_DAILY_DRIFT * i as f64)
        .collect())
}

/// `last + slope * (i + 1)` with the slope of a least-squares line through the
/// trailing [`TREND_WINDOW`] points
pub fn trend_curve(prices: &PriceHistory, horizon_days: u32) -> Result<Vec<f64>, ForecastError> {
    prices.ensure_len(2)?;
    let window = prices.tail(TREND_WINDOW);
    let x: Vec<f64> = (0..window.len()).map(|i| i as f64).collect();

    let slope = linear_regression_slope(&x, window).unwrap_or(0.0);
    let last = window[window.len() - 1];

    Ok((1..=horizon_days)
        .map(|i| last + slope * i as f64)
        .collect())
}

/// Slope of the degree-1 least-squares fit of `y` on `x`
pub fn linear_regression_slope(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }

    let mean_x = x.mean();
    let mean_y = y.mean();

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        numerator += (xi - mean_x) * (yi - mean_y);
        denominator += (xi - mean_x).powi(2);
    }

    if denominator == 0.0 {
        return None;
    }

    Some(numerator / denominator)
}

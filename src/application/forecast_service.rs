use crate::application::forecasting::baselines::{moving_average_curve, trend_curve};
use crate::application::forecasting::explanation::{explain_fallback, explain_prediction};
use crate::application::forecasting::{EnsembleBlender, HorizonExpander};
use crate::application::market_data::SignalGenerator;
use crate::application::ml::FeatureBuilder;
use crate::application::monitoring::anomaly_detector::{DEFAULT_Z_THRESHOLD, detect_anomalies};
use crate::domain::drought::{BasinData, DroughtMetrics};
use crate::domain::errors::{ForecastError, ForecastFailure};
use crate::domain::forecast::{
    ConfidenceIntervals, EnsembleComponents, EnsembleForecast, EnsemblePoint, Forecast,
    ForecastFactors, ForecastModel, ForecastPoint, MarketMomentum, PredictionResult,
};
use crate::domain::market::price_history::PriceHistory;
use crate::domain::ports::{DroughtDataSource, PointPredictor, PriceHistorySource};
use crate::domain::signal::SignalReport;
use chrono::{NaiveDate, TimeDelta, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// Confidence reported for curves built from the local baselines only
pub const FALLBACK_CONFIDENCE: f64 = 0.65;

/// Scale of the confidence band around each forecast point
pub const CONFIDENCE_INTERVAL_WIDTH: f64 = 0.15;

/// Everything a forecast request reads before any computation
struct ForecastInputs {
    history: PriceHistory,
    current_price: f64,
    drought: DroughtMetrics,
    basin: Option<BasinData>,
}

/// Orchestrates history and drought reads, feature building, the hosted
/// prediction and the local baselines into forecasts and signals.
///
/// Holds no mutable state; every request reads its inputs afresh.
pub struct ForecastService {
    prices: Arc<dyn PriceHistorySource>,
    drought: Arc<dyn DroughtDataSource>,
    predictor: Option<Arc<dyn PointPredictor>>,
    features: FeatureBuilder,
    horizon: HorizonExpander,
    blender: EnsembleBlender,
    signals: SignalGenerator,
    allow_fallback: bool,
    noise_seed: Option<u64>,
    reference_date: Option<NaiveDate>,
}

impl ForecastService {
    pub fn new(
        prices: Arc<dyn PriceHistorySource>,
        drought: Arc<dyn DroughtDataSource>,
        predictor: Option<Arc<dyn PointPredictor>>,
    ) -> Self {
        Self {
            prices,
            drought,
            predictor,
            features: FeatureBuilder::new(),
            horizon: HorizonExpander::default(),
            blender: EnsembleBlender::default(),
            signals: SignalGenerator::default(),
            allow_fallback: true,
            noise_seed: None,
            reference_date: None,
        }
    }

    /// Whether an unavailable hosted model degrades to the baseline blend
    pub fn with_fallback(mut self, allow_fallback: bool) -> Self {
        self.allow_fallback = allow_fallback;
        self
    }

    /// Seed horizon noise so repeated requests produce identical curves
    pub fn with_noise_seed(mut self, seed: Option<u64>) -> Self {
        self.noise_seed = seed;
        self
    }

    pub fn with_horizon_expander(mut self, horizon: HorizonExpander) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_blender(mut self, blender: EnsembleBlender) -> Self {
        self.blender = blender;
        self
    }

    pub fn with_signal_generator(mut self, signals: SignalGenerator) -> Self {
        self.signals = signals;
        self
    }

    pub fn with_feature_builder(mut self, features: FeatureBuilder) -> Self {
        self.features = features;
        self
    }

    /// Pin the "today" used for calendar features and curve dates
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub async fn forecast(
        &self,
        contract_code: &str,
        horizon_days: u32,
    ) -> Result<Forecast, ForecastError> {
        let span = info_span!("forecast", request_id = %Uuid::new_v4(), contract = contract_code);
        self.forecast_inner(contract_code, horizon_days)
            .instrument(span)
            .await
    }

    pub async fn ensemble_forecast(
        &self,
        contract_code: &str,
        horizon_days: u32,
    ) -> Result<EnsembleForecast, ForecastError> {
        let span = info_span!("ensemble", request_id = %Uuid::new_v4(), contract = contract_code);
        self.ensemble_inner(contract_code, horizon_days)
            .instrument(span)
            .await
    }

    /// Signals for each contract in turn; a failing contract is reported in
    /// `failures` and the rest still run
    pub async fn trading_signals(&self, contracts: &[String], horizon_days: u32) -> SignalReport {
        let span = info_span!("signals", request_id = %Uuid::new_v4(), contracts = contracts.len());
        async {
            let mut signals = Vec::with_capacity(contracts.len());
            let mut failures = Vec::new();

            for contract_code in contracts {
                match self.forecast(contract_code, horizon_days).await {
                    Ok(forecast) => signals.push(self.signals.generate_for_model(
                        contract_code,
                        forecast.current_price,
                        &forecast.predicted_prices,
                        forecast.model_confidence,
                        forecast.model,
                    )),
                    Err(e) => {
                        warn!("Signal for {} failed at {}: {}", contract_code, e.stage(), e);
                        failures.push(ForecastFailure::new(contract_code, &e));
                    }
                }
            }

            info!(
                "Generated {} signals ({} failed)",
                signals.len(),
                failures.len()
            );
            SignalReport {
                total_signals: signals.len(),
                signals,
                failures,
                analysis_period_days: horizon_days,
                generated_at: Utc::now(),
            }
        }
        .instrument(span)
        .await
    }

    async fn forecast_inner(
        &self,
        contract_code: &str,
        horizon_days: u32,
    ) -> Result<Forecast, ForecastError> {
        let inputs = self.load_inputs(contract_code).await?;
        let as_of = self.as_of();
        let prediction = self.predict(&inputs, as_of).await?;
        let current_price = inputs.current_price;

        let (curve, confidence, model, price_change, explanation) = match &prediction {
            Some(result) => {
                let mut rng = self.rng();
                let curve = self.horizon.expand(
                    result.value,
                    current_price,
                    horizon_days,
                    inputs.drought.severity,
                    as_of,
                    &mut rng,
                );
                let explanation = explain_prediction(
                    current_price,
                    result.value,
                    result.confidence,
                    &inputs.drought,
                );
                (
                    curve,
                    result.confidence,
                    ForecastModel::Hosted,
                    Some(result.value - current_price),
                    explanation,
                )
            }
            None => {
                let blended = self.fallback_curve(&inputs.history, horizon_days)?;
                (
                    dated_curve(&blended, as_of),
                    FALLBACK_CONFIDENCE,
                    ForecastModel::Fallback,
                    None,
                    explain_fallback(&inputs.drought),
                )
            }
        };

        let factors = ForecastFactors {
            drought_severity: inputs.drought.severity,
            drought_spi: inputs.drought.spi,
            drought_impact_pct: inputs.drought.price_impact_pct(),
            price_change,
            price_change_pct: price_change.map(|change| change / current_price * 100.0),
            market_momentum: MarketMomentum::from_prices(inputs.history.as_slice()),
            history_anomalies: detect_anomalies(inputs.history.as_slice(), DEFAULT_Z_THRESHOLD)
                .len(),
            explanation,
        };

        info!(
            "Forecast for {}: {} points from {:.2} ({:?}, confidence {:.2})",
            contract_code,
            curve.len(),
            current_price,
            model,
            confidence
        );

        Ok(Forecast {
            contract_code: contract_code.to_string(),
            current_price,
            confidence_intervals: ConfidenceIntervals::around(
                &curve,
                confidence,
                CONFIDENCE_INTERVAL_WIDTH,
            ),
            predicted_prices: curve,
            model_confidence: confidence,
            factors,
            model,
            generated_at: Utc::now(),
        })
    }

    async fn ensemble_inner(
        &self,
        contract_code: &str,
        horizon_days: u32,
    ) -> Result<EnsembleForecast, ForecastError> {
        let inputs = self.load_inputs(contract_code).await?;
        let as_of = self.as_of();
        let prediction = self.predict(&inputs, as_of).await?;

        let moving_average = moving_average_curve(&inputs.history, horizon_days)?;
        let trend = trend_curve(&inputs.history, horizon_days)?;

        let (model_curve, blended, weights, model, confidence) = match &prediction {
            Some(result) => {
                let mut rng = self.rng();
                let model_curve: Vec<f64> = self
                    .horizon
                    .expand(
                        result.value,
                        inputs.current_price,
                        horizon_days,
                        inputs.drought.severity,
                        as_of,
                        &mut rng,
                    )
                    .iter()
                    .map(|p| p.price)
                    .collect();
                let blended = self.blender.blend(&model_curve, &moving_average, &trend)?;
                (
                    Some(model_curve),
                    blended,
                    self.blender.weights(),
                    ForecastModel::Hosted,
                    result.confidence,
                )
            }
            None => (
                None,
                self.blender.blend_fallback(&moving_average, &trend)?,
                self.blender.fallback_weights(),
                ForecastModel::Fallback,
                FALLBACK_CONFIDENCE,
            ),
        };

        let points = blended
            .iter()
            .enumerate()
            .map(|(i, &price)| EnsemblePoint {
                date: as_of + TimeDelta::days(i as i64 + 1),
                price,
                components: EnsembleComponents {
                    hosted_model: model_curve.as_ref().map(|curve| curve[i]),
                    moving_average: moving_average[i],
                    trend: trend[i],
                },
            })
            .collect::<Vec<_>>();

        info!(
            "Ensemble for {}: {} points ({:?})",
            contract_code,
            points.len(),
            model
        );

        Ok(EnsembleForecast {
            contract_code: contract_code.to_string(),
            ensemble_forecast: points,
            model_weights: weights,
            model,
            confidence,
            generated_at: Utc::now(),
        })
    }

    async fn load_inputs(&self, contract_code: &str) -> Result<ForecastInputs, ForecastError> {
        let history = self.prices.price_history(contract_code).await?;
        let current_price = history
            .latest()
            .ok_or(ForecastError::InsufficientHistory {
                required: 1,
                actual: 0,
            })?;
        let drought = self.drought.current_metrics().await?;
        let basin = self.drought.basin_data().await?;

        debug!(
            "Inputs for {}: {} prices, latest {:.2}, drought severity {}",
            contract_code,
            history.len(),
            current_price,
            drought.severity
        );

        Ok(ForecastInputs {
            history,
            current_price,
            drought,
            basin,
        })
    }

    /// Hosted prediction, or `None` when the curve should come from the
    /// baselines instead
    async fn predict(
        &self,
        inputs: &ForecastInputs,
        as_of: NaiveDate,
    ) -> Result<Option<PredictionResult>, ForecastError> {
        let features =
            self.features
                .build(&inputs.drought, &inputs.history, inputs.basin.as_ref(), as_of)?;

        let outcome = match &self.predictor {
            Some(predictor) => predictor.predict(&features).await,
            None => Err(ForecastError::prediction_unavailable(
                "no hosted predictor configured",
            )),
        };

        match outcome {
            Ok(result) => Ok(Some(result)),
            Err(e @ ForecastError::PredictionUnavailable { .. }) if self.allow_fallback => {
                warn!("{}; falling back to baseline blend", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn fallback_curve(
        &self,
        history: &PriceHistory,
        horizon_days: u32,
    ) -> Result<Vec<f64>, ForecastError> {
        let moving_average = moving_average_curve(history, horizon_days)?;
        let trend = trend_curve(history, horizon_days)?;
        self.blender.blend_fallback(&moving_average, &trend)
    }

    fn as_of(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    fn rng(&self) -> StdRng {
        match self.noise_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

fn dated_curve(prices: &[f64], start: NaiveDate) -> Vec<ForecastPoint> {
    prices
        .iter()
        .zip(1u32..)
        .map(|(&price, day)| ForecastPoint {
            date: start + TimeDelta::days(day as i64),
            price,
            day,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dated_curve_starts_the_day_after() {
        let start = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let curve = dated_curve(&[1.0, 2.0], start);

        assert_eq!(curve[0].day, 1);
        assert_eq!(curve[0].date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(curve[1].day, 2);
        assert_eq!(curve[1].price, 2.0);
    }
}

//! Feature engineering for the hosted NQH2O price model.
//!
//! Turns drought indicators, price history and the calendar date into the
//! fixed 29-field feature set listed in
//! [`FEATURE_NAMES`](crate::domain::ml::feature_registry::FEATURE_NAMES).
//! Short histories are rejected rather than padded with defaults.

use crate::domain::drought::{BasinData, DroughtMetrics};
use crate::domain::errors::ForecastError;
use crate::domain::market::price_history::PriceHistory;
use crate::domain::ml::feature_registry::FeatureVector;
use chrono::{Datelike, NaiveDate};
use statrs::statistics::Statistics;
use std::f64::consts::PI;
use tracing::debug;

/// Points needed for the 12-week moving-average ratio, the longest window
pub const FULL_HISTORY_LEN: usize = 12;

/// Months (1-12) of the California dry season
pub const DROUGHT_SEASON_MONTHS: &[u32] = &[6, 7, 8, 9, 10];
/// Months (1-12) of the California wet season
pub const WET_SEASON_MONTHS: &[u32] = &[12, 1, 2, 3];

/// First day of the model's training data, origin of `time_trend`
pub fn time_trend_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 1).unwrap_or_default()
}

#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    basin_defaults: BasinData,
}

impl FeatureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the basin readings used when a request carries none
    pub fn with_basin_defaults(basin_defaults: BasinData) -> Self {
        Self { basin_defaults }
    }

    pub fn build(
        &self,
        drought: &DroughtMetrics,
        prices: &PriceHistory,
        basin: Option<&BasinData>,
        as_of: NaiveDate,
    ) -> Result<FeatureVector, ForecastError> {
        drought.validate()?;
        prices.ensure_len(FULL_HISTORY_LEN)?;

        let mut features = FeatureVector::new();
        self.insert_basin(&mut features, basin.unwrap_or(&self.basin_defaults));
        insert_drought(&mut features, drought);
        insert_price(&mut features, prices)?;
        insert_calendar(&mut features, as_of);

        features.validate()?;
        debug!(
            "Built {} features from {} prices (as of {})",
            features.len(),
            prices.len(),
            as_of
        );
        Ok(features)
    }

    fn insert_basin(&self, features: &mut FeatureVector, basin: &BasinData) {
        features.insert("Chino_Basin_eddi90d_lag_12", basin.chino_eddi90d);
        features.insert("Mojave_Basin_pdsi_lag_12", basin.mojave_pdsi);
        features.insert("California_Surface_Water_spi180d_lag_12", basin.ca_spi180d);
        features.insert("Central_Basin_eddi1y_lag_12", basin.central_eddi1y);
        features.insert("California_Surface_Water_spi90d_lag_12", basin.ca_spi90d);
        features.insert("California_Surface_Water_spei1y_lag_12", basin.ca_spei1y);
    }
}

fn flag(condition: bool) -> f64 {
    if condition { 1.0 } else { 0.0 }
}

fn insert_drought(features: &mut FeatureVector, drought: &DroughtMetrics) {
    features.insert("drought_composite_spi", drought.spi);
    features.insert("drought_composite_spei", drought.spei);
    features.insert("drought_composite_pdsi", drought.pdsi);
    features.insert("severe_drought_indicator", flag(drought.is_severe()));
    features.insert("extreme_drought_indicator", flag(drought.is_extreme()));
    features.insert("drought_trend_4w", drought.trend_4w);
    features.insert("drought_trend_8w", drought.trend_8w);
}

fn insert_price(features: &mut FeatureVector, prices: &PriceHistory) -> Result<(), ForecastError> {
    let lag = |k: usize| {
        prices.lag(k).ok_or(ForecastError::InsufficientHistory {
            required: k,
            actual: prices.len(),
        })
    };
    let latest = lag(1)?;

    features.insert("nqh2o_lag_1", latest);
    features.insert("nqh2o_lag_2", lag(2)?);
    features.insert("nqh2o_lag_4", lag(4)?);

    features.insert("price_momentum_4w", momentum(latest, lag(4)?));
    features.insert("price_momentum_8w", momentum(latest, lag(8)?));

    features.insert("price_volatility_4w", prices.tail(4).population_std_dev());
    features.insert("price_volatility_8w", prices.tail(8).population_std_dev());

    features.insert("price_vs_ma_4w", relative_to(latest, prices.tail(4).mean()));
    features.insert("price_vs_ma_12w", relative_to(latest, prices.tail(12).mean()));

    Ok(())
}

fn insert_calendar(features: &mut FeatureVector, as_of: NaiveDate) {
    let month = as_of.month();
    let week = as_of.iso_week().week();

    let month_angle = 2.0 * PI * month as f64 / 12.0;
    let week_angle = 2.0 * PI * week as f64 / 52.0;
    features.insert("month_sin", month_angle.sin());
    features.insert("month_cos", month_angle.cos());
    features.insert("week_sin", week_angle.sin());
    features.insert("week_cos", week_angle.cos());

    features.insert("is_drought_season", flag(DROUGHT_SEASON_MONTHS.contains(&month)));
    features.insert("is_wet_season", flag(WET_SEASON_MONTHS.contains(&month)));

    let days = (as_of - time_trend_epoch()).num_days();
    features.insert("time_trend", days as f64);
}

/// Fractional change from `base` to `latest`; prices are strictly positive
fn momentum(latest: f64, base: f64) -> f64 {
    (latest - base) / base
}

fn relative_to(latest: f64, average: f64) -> f64 {
    (latest - average) / average
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::feature_registry::FEATURE_NAMES;

    fn drought() -> DroughtMetrics {
        DroughtMetrics::new(-1.5, -1.2, -2.0, 2, -0.3, -0.5).unwrap()
    }

    fn history(len: usize) -> PriceHistory {
        PriceHistory::new((0..len).map(|i| 400.0 + i as f64).collect()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_full_history_yields_every_feature() {
        let features = FeatureBuilder::new()
            .build(&drought(), &history(12), None, date(2025, 7, 15))
            .unwrap();

        assert_eq!(features.len(), FEATURE_NAMES.len());
        for name in FEATURE_NAMES {
            let value = features.get(name).expect(name);
            assert!(value.is_finite(), "{} is not finite", name);
        }
    }

    #[test]
    fn test_short_history_is_rejected() {
        let err = FeatureBuilder::new()
            .build(&drought(), &history(3), None, date(2025, 7, 15))
            .unwrap_err();

        assert_eq!(
            err,
            ForecastError::InsufficientHistory {
                required: FULL_HISTORY_LEN,
                actual: 3
            }
        );
    }

    #[test]
    fn test_price_features() {
        // 400..=411, latest = 411
        let features = FeatureBuilder::new()
            .build(&drought(), &history(12), None, date(2025, 7, 15))
            .unwrap();

        assert_eq!(features.get("nqh2o_lag_1"), Some(411.0));
        assert_eq!(features.get("nqh2o_lag_2"), Some(410.0));
        assert_eq!(features.get("nqh2o_lag_4"), Some(408.0));

        let m4 = features.get("price_momentum_4w").unwrap();
        assert!((m4 - 3.0 / 408.0).abs() < 1e-12);
        let m8 = features.get("price_momentum_8w").unwrap();
        assert!((m8 - 7.0 / 404.0).abs() < 1e-12);

        // Population std of 4 consecutive integers = sqrt(1.25)
        let v4 = features.get("price_volatility_4w").unwrap();
        assert!((v4 - 1.25_f64.sqrt()).abs() < 1e-9);
        // Population std of 8 consecutive integers = sqrt(5.25)
        let v8 = features.get("price_volatility_8w").unwrap();
        assert!((v8 - 5.25_f64.sqrt()).abs() < 1e-9);

        let ma4 = features.get("price_vs_ma_4w").unwrap();
        assert!((ma4 - (411.0 - 409.5) / 409.5).abs() < 1e-12);
        let ma12 = features.get("price_vs_ma_12w").unwrap();
        assert!((ma12 - (411.0 - 405.5) / 405.5).abs() < 1e-12);
    }

    #[test]
    fn test_calendar_features() {
        let features = FeatureBuilder::new()
            .build(&drought(), &history(12), None, date(2019, 7, 1))
            .unwrap();

        assert_eq!(features.get("is_drought_season"), Some(1.0));
        assert_eq!(features.get("is_wet_season"), Some(0.0));
        assert_eq!(features.get("time_trend"), Some(181.0));

        let month_sin = features.get("month_sin").unwrap();
        assert!((month_sin - (2.0 * PI * 7.0 / 12.0).sin()).abs() < 1e-12);

        // 2019-07-01 is ISO week 27
        let week_cos = features.get("week_cos").unwrap();
        assert!((week_cos - (2.0 * PI * 27.0 / 52.0).cos()).abs() < 1e-12);

        let winter = FeatureBuilder::new()
            .build(&drought(), &history(12), None, date(2025, 1, 10))
            .unwrap();
        assert_eq!(winter.get("is_drought_season"), Some(0.0));
        assert_eq!(winter.get("is_wet_season"), Some(1.0));
    }

    #[test]
    fn test_drought_indicators() {
        let extreme = DroughtMetrics::new(-2.5, -2.1, -3.8, 3, -0.6, -0.9).unwrap();
        let features = FeatureBuilder::new()
            .build(&extreme, &history(12), None, date(2025, 7, 15))
            .unwrap();

        assert_eq!(features.get("severe_drought_indicator"), Some(1.0));
        assert_eq!(features.get("extreme_drought_indicator"), Some(1.0));
        assert_eq!(features.get("drought_composite_pdsi"), Some(-3.8));

        let mild = DroughtMetrics::new(-0.5, -0.4, -0.6, 1, 0.0, 0.0).unwrap();
        let features = FeatureBuilder::new()
            .build(&mild, &history(12), None, date(2025, 7, 15))
            .unwrap();
        assert_eq!(features.get("severe_drought_indicator"), Some(0.0));
    }

    #[test]
    fn test_basin_passthrough_and_defaults() {
        let basin = BasinData {
            chino_eddi90d: -1.1,
            ..BasinData::default()
        };
        let features = FeatureBuilder::new()
            .build(&drought(), &history(12), Some(&basin), date(2025, 7, 15))
            .unwrap();
        assert_eq!(features.get("Chino_Basin_eddi90d_lag_12"), Some(-1.1));
        assert_eq!(features.get("Mojave_Basin_pdsi_lag_12"), Some(-1.0));

        let defaults = FeatureBuilder::new()
            .build(&drought(), &history(12), None, date(2025, 7, 15))
            .unwrap();
        assert_eq!(defaults.get("Chino_Basin_eddi90d_lag_12"), Some(-0.5));
    }
}

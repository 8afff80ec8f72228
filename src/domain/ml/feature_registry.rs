use crate::domain::errors::ForecastError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Feature names the hosted NQH2O model was trained on.
/// Any change here is a breaking change for the deployed model.
pub const FEATURE_NAMES: &[&str] = &[
    // Basin lag-12 drought readings
    "Chino_Basin_eddi90d_lag_12",
    "Mojave_Basin_pdsi_lag_12",
    "California_Surface_Water_spi180d_lag_12",
    "Central_Basin_eddi1y_lag_12",
    "California_Surface_Water_spi90d_lag_12",
    "California_Surface_Water_spei1y_lag_12",
    // Drought composites
    "drought_composite_spi",
    "drought_composite_spei",
    "drought_composite_pdsi",
    "severe_drought_indicator",
    "extreme_drought_indicator",
    "drought_trend_4w",
    "drought_trend_8w",
    // Price history
    "nqh2o_lag_1",
    "nqh2o_lag_2",
    "nqh2o_lag_4",
    "price_momentum_4w",
    "price_momentum_8w",
    "price_volatility_4w",
    "price_volatility_8w",
    "price_vs_ma_4w",
    "price_vs_ma_12w",
    // Calendar
    "month_sin",
    "month_cos",
    "week_sin",
    "week_cos",
    "is_drought_season",
    "is_wet_season",
    "time_trend",
];

/// Named feature set sent to the hosted model as a single instance.
///
/// Serializes as a flat JSON object `{ "nqh2o_lag_1": 412.0, ... }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: BTreeMap<String, f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Ensures exactly the registry keys are present and every value is finite
    pub fn validate(&self) -> Result<(), ForecastError> {
        for name in FEATURE_NAMES {
            match self.values.get(*name) {
                None => {
                    return Err(ForecastError::MissingFeature {
                        name: name.to_string(),
                    });
                }
                Some(value) if !value.is_finite() => {
                    return Err(ForecastError::NonFiniteFeature {
                        name: name.to_string(),
                        value: *value,
                    });
                }
                Some(_) => {}
            }
        }

        // Unknown keys would be silently dropped by the hosted preprocessor
        if let Some(extra) = self
            .values
            .keys()
            .find(|k| !FEATURE_NAMES.contains(&k.as_str()))
        {
            return Err(ForecastError::UnexpectedFeature {
                name: extra.clone(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_vector() -> FeatureVector {
        let mut fv = FeatureVector::new();
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            fv.insert(name, i as f64);
        }
        fv
    }

    #[test]
    fn test_registry_has_29_unique_names() {
        assert_eq!(FEATURE_NAMES.len(), 29);
        let unique: std::collections::HashSet<_> = FEATURE_NAMES.iter().collect();
        assert_eq!(unique.len(), 29);
    }

    #[test]
    fn test_validate_full_vector() {
        assert!(full_vector().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_missing_key() {
        let mut fv = FeatureVector::new();
        fv.insert("nqh2o_lag_1", 400.0);
        assert!(matches!(
            fv.validate(),
            Err(ForecastError::MissingFeature { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_key() {
        let mut fv = full_vector();
        fv.insert("precipitation", 35.0);
        assert_eq!(
            fv.validate(),
            Err(ForecastError::UnexpectedFeature {
                name: "precipitation".to_string()
            })
        );
    }

    #[test]
    fn test_validate_rejects_nan() {
        let mut fv = full_vector();
        fv.insert("time_trend", f64::NAN);
        assert!(matches!(
            fv.validate(),
            Err(ForecastError::NonFiniteFeature { ref name, .. }) if name == "time_trend"
        ));
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let mut fv = FeatureVector::new();
        fv.insert("nqh2o_lag_1", 412.25);
        let json = serde_json::to_value(&fv).unwrap();
        assert_eq!(json["nqh2o_lag_1"], 412.25);
    }
}

//! Wire format of the hosted prediction endpoint.
//!
//! Requests carry one instance: `{"instances": [{<feature>: <value>, ...}]}`.
//! Deployments answer either with a bare list (`[412.5]`, `[[412.5]]`) or an
//! object `{"predictions": [...], "individual_predictions": {...}}`, where
//! each individual model maps to a number or a one-element list.

use crate::domain::errors::ForecastError;
use crate::domain::forecast::PredictionResult;
use crate::domain::ml::feature_registry::FeatureVector;
use serde::Serialize;
use serde_json::Value;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Confidence reported when the response carries no per-model spread
pub const DEFAULT_CONFIDENCE: f64 = 0.85;

#[derive(Debug, Serialize)]
pub struct PredictRequest<'a> {
    pub instances: [&'a FeatureVector; 1],
}

impl<'a> PredictRequest<'a> {
    pub fn new(features: &'a FeatureVector) -> Self {
        Self {
            instances: [features],
        }
    }
}

pub fn parse_prediction_response(body: &str) -> Result<PredictionResult, ForecastError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        ForecastError::prediction_unavailable(format!("malformed response body: {}", e))
    })?;
    parse_prediction_value(&value)
}

pub fn parse_prediction_value(value: &Value) -> Result<PredictionResult, ForecastError> {
    let (predictions, individual) = match value {
        Value::Array(items) => (items.as_slice(), BTreeMap::new()),
        Value::Object(map) => {
            let predictions = map
                .get("predictions")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    ForecastError::prediction_unavailable("response has no predictions array")
                })?;
            let individual = map
                .get("individual_predictions")
                .map(parse_individual)
                .transpose()?
                .unwrap_or_default();
            (predictions.as_slice(), individual)
        }
        other => {
            return Err(ForecastError::prediction_unavailable(format!(
                "unexpected response type: {}",
                type_name(other)
            )));
        }
    };

    let first = predictions
        .first()
        .ok_or_else(|| ForecastError::prediction_unavailable("predictions array is empty"))?;

    // A nested object carries its own envelope
    if first.is_object() {
        return parse_prediction_value(first);
    }

    let prediction = scalar(first)
        .ok_or_else(|| ForecastError::prediction_unavailable("prediction is not a number"))?;
    if !prediction.is_finite() {
        return Err(ForecastError::prediction_unavailable(format!(
            "prediction is not finite: {}",
            prediction
        )));
    }

    Ok(PredictionResult {
        value: prediction,
        confidence: agreement_confidence(prediction, &individual),
        individual_predictions: individual,
    })
}

/// `1 - stdev / prediction` across individual models, clamped to 0..1
pub fn agreement_confidence(prediction: f64, individual: &BTreeMap<String, f64>) -> f64 {
    if individual.len() < 2 || prediction == 0.0 {
        return DEFAULT_CONFIDENCE;
    }
    let spread = individual.values().population_std_dev();
    if !spread.is_finite() {
        return DEFAULT_CONFIDENCE;
    }
    (1.0 - spread / prediction.abs()).clamp(0.0, 1.0)
}

fn parse_individual(value: &Value) -> Result<BTreeMap<String, f64>, ForecastError> {
    let map = value.as_object().ok_or_else(|| {
        ForecastError::prediction_unavailable("individual_predictions is not an object")
    })?;

    map.iter()
        .map(|(name, v)| {
            scalar(v)
                .filter(|p| p.is_finite())
                .map(|p| (name.clone(), p))
                .ok_or_else(|| {
                    ForecastError::prediction_unavailable(format!(
                        "individual prediction {} is not a number",
                        name
                    ))
                })
        })
        .collect()
}

/// A number, or the first element of a list of numbers
fn scalar(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Array(items) => items.first().and_then(Value::as_f64),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Default |z| above which a point is anomalous
pub const DEFAULT_Z_THRESHOLD: f64 = 2.0;
/// |z| above which an anomaly is high severity
pub const HIGH_SEVERITY_Z: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySeverity {
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub index: usize,
    pub value: f64,
    pub z_score: f64,
    pub severity: AnomalySeverity,
}

/// Flags points whose distance from the series mean exceeds `threshold`
/// population standard deviations. Flat or empty series have no anomalies.
pub fn detect_anomalies(series: &[f64], threshold: f64) -> Vec<Anomaly> {
    if series.len() < 2 {
        return Vec::new();
    }

    let mean = series.mean();
    let std_dev = series.population_std_dev();
    if std_dev == 0.0 || !std_dev.is_finite() {
        return Vec::new();
    }

    series
        .iter()
        .enumerate()
        .filter_map(|(index, &value)| {
            let z_score = ((value - mean) / std_dev).abs();
            (z_score > threshold).then(|| Anomaly {
                index,
                value,
                z_score,
                severity: if z_score > HIGH_SEVERITY_Z {
                    AnomalySeverity::High
                } else {
                    AnomalySeverity::Medium
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_spike() {
        let mut series = vec![400.0; 19];
        series.push(480.0);

        let anomalies = detect_anomalies(&series, DEFAULT_Z_THRESHOLD);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].index, 19);
        assert_eq!(anomalies[0].severity, AnomalySeverity::High);
    }

    #[test]
    fn test_flat_and_empty_series() {
        assert!(detect_anomalies(&[], DEFAULT_Z_THRESHOLD).is_empty());
        assert!(detect_anomalies(&[400.0; 10], DEFAULT_Z_THRESHOLD).is_empty());
    }

    #[test]
    fn test_medium_severity() {
        // Ten points at 0 and one at 10: z of the outlier is sqrt(10) ~ 3.16
        let mut series = vec![0.0; 10];
        series.push(10.0);
        let anomalies = detect_anomalies(&series, DEFAULT_Z_THRESHOLD);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].severity, AnomalySeverity::High);

        // Five at 0 and one at 10: z = sqrt(5) ~ 2.24
        let mut series = vec![0.0; 5];
        series.push(10.0);
        let anomalies = detect_anomalies(&series, DEFAULT_Z_THRESHOLD);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].severity, AnomalySeverity::Medium);
    }
}

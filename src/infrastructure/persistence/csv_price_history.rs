use crate::domain::errors::ForecastError;
use crate::domain::market::price_history::PriceHistory;
use crate::domain::ports::PriceHistorySource;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct HistoricalPriceRecord {
    date: NaiveDate,
    contract_code: String,
    close: f64,
}

/// Historical settlement prices read from a CSV export.
///
/// Expects `date,contract_code,close` columns (others are ignored). The file
/// is read on every request; nothing is cached between forecasts.
#[derive(Debug, Clone)]
pub struct CsvPriceHistorySource {
    path: PathBuf,
    window: usize,
}

impl CsvPriceHistorySource {
    pub fn new(path: PathBuf, window: usize) -> Self {
        Self {
            path,
            window: window.max(1),
        }
    }
}

#[async_trait]
impl PriceHistorySource for CsvPriceHistorySource {
    async fn price_history(&self, contract_code: &str) -> Result<PriceHistory, ForecastError> {
        let unavailable = |reason: String| ForecastError::PriceHistoryUnavailable {
            contract_code: contract_code.to_string(),
            reason,
        };

        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| unavailable(format!("cannot read {}: {}", self.path.display(), e)))?;

        let history = read_price_history(bytes.as_slice(), contract_code, self.window)?;
        debug!(
            "Loaded {} prices for {} from {}",
            history.len(),
            contract_code,
            self.path.display()
        );
        Ok(history)
    }
}

/// Parses CSV rows for one contract, ordered by date, keeping the trailing
/// `window` closes
pub fn read_price_history<R: Read>(
    reader: R,
    contract_code: &str,
    window: usize,
) -> Result<PriceHistory, ForecastError> {
    let unavailable = |reason: String| ForecastError::PriceHistoryUnavailable {
        contract_code: contract_code.to_string(),
        reason,
    };

    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows: Vec<(NaiveDate, f64)> = Vec::new();
    for result in rdr.deserialize() {
        let record: HistoricalPriceRecord =
            result.map_err(|e| unavailable(format!("malformed row: {}", e)))?;
        if record.contract_code == contract_code {
            rows.push((record.date, record.close));
        }
    }

    if rows.is_empty() {
        return Err(unavailable("no rows for contract".to_string()));
    }

    // Only closes inside the window are validated
    rows.sort_by_key(|(date, _)| *date);
    let start = rows.len().saturating_sub(window);
    let prices = rows[start..].iter().map(|(_, close)| *close).collect();
    PriceHistory::new(prices)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
date,contract_code,close,volume
2025-01-03,NQH25,402.0,10
2025-01-01,NQH25,400.0,12
2025-01-02,NQH25,401.0,8
2025-01-01,NQM25,390.0,5
";

    #[test]
    fn test_filters_and_orders_by_date() {
        let history = read_price_history(SAMPLE.as_bytes(), "NQH25", 30).unwrap();
        assert_eq!(history.as_slice(), &[400.0, 401.0, 402.0]);
    }

    #[test]
    fn test_keeps_trailing_window() {
        let history = read_price_history(SAMPLE.as_bytes(), "NQH25", 2).unwrap();
        assert_eq!(history.as_slice(), &[401.0, 402.0]);
    }

    #[test]
    fn test_bad_close_outside_window_is_ignored() {
        let mut csv = String::from("date,contract_code,close\n2024-01-01,NQH25,0.0\n");
        for day in 1..=28 {
            csv.push_str(&format!("2025-02-{:02},NQH25,{}\n", day, 400.0 + day as f64));
        }

        let history = read_price_history(csv.as_bytes(), "NQH25", 12).unwrap();
        assert_eq!(history.len(), 12);
        assert_eq!(history.latest(), Some(428.0));

        let err = read_price_history(csv.as_bytes(), "NQH25", 29).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidPriceHistory { index: 0, .. }));
    }

    #[test]
    fn test_unknown_contract() {
        let err = read_price_history(SAMPLE.as_bytes(), "NQZ25", 30).unwrap_err();
        assert!(matches!(err, ForecastError::PriceHistoryUnavailable { .. }));
    }

    #[test]
    fn test_malformed_row() {
        let bad = "date,contract_code,close\n2025-01-01,NQH25,abc\n";
        assert!(read_price_history(bad.as_bytes(), "NQH25", 30).is_err());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = CsvPriceHistorySource::new(PathBuf::from("/nonexistent/prices.csv"), 30);
        let err = source.price_history("NQH25").await.unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}

use crate::domain::errors::ForecastError;
use crate::domain::market::price_history::PriceHistory;
use crate::domain::ports::PriceHistorySource;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Price history held in memory, keyed by contract code
#[derive(Clone, Default)]
pub struct InMemoryPriceHistorySource {
    histories: Arc<RwLock<HashMap<String, PriceHistory>>>,
}

impl InMemoryPriceHistorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(contract_code: &str, history: PriceHistory) -> Self {
        let mut histories = HashMap::new();
        histories.insert(contract_code.to_string(), history);
        Self {
            histories: Arc::new(RwLock::new(histories)),
        }
    }

    pub async fn insert(&self, contract_code: &str, history: PriceHistory) {
        self.histories
            .write()
            .await
            .insert(contract_code.to_string(), history);
    }
}

#[async_trait]
impl PriceHistorySource for InMemoryPriceHistorySource {
    async fn price_history(&self, contract_code: &str) -> Result<PriceHistory, ForecastError> {
        self.histories
            .read()
            .await
            .get(contract_code)
            .cloned()
            .ok_or_else(|| ForecastError::PriceHistoryUnavailable {
                contract_code: contract_code.to_string(),
                reason: "no history loaded".to_string(),
            })
    }
}

// Forecast orchestration
pub mod forecast_service;

// Horizon expansion, baselines and ensemble blending
pub mod forecasting;

// Trading signal derivation
pub mod market_data;

// Model feature construction
pub mod ml;

// Price history anomaly checks
pub mod monitoring;

pub use forecast_service::ForecastService;

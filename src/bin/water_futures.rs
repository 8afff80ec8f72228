//! Water Futures Forecaster - command line entry point
//!
//! Produces NQH2O forecasts, ensemble curves and trading signals as pretty
//! JSON on stdout. Logs go to stderr.
//!
//! # Usage
//! ```sh
//! cargo run -- forecast --contract NQH25 --horizon 7
//! cargo run -- ensemble --contract NQM25
//! cargo run -- signals --contracts NQH25,NQZ25
//! ```
//!
//! # Environment Variables
//! - `PREDICTOR_ENDPOINT_URL` - Hosted model endpoint (unset: baselines only)
//! - `PRICE_HISTORY_CSV` - Historical prices (default: data/water_futures_historical.csv)
//! - `LOG_FORMAT` - `pretty` or `compact` (default: pretty)

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;
use water_futures::application::ForecastService;
use water_futures::config::{Config, LogFormat};
use water_futures::domain::errors::{ForecastError, ForecastFailure};
use water_futures::domain::ports::PointPredictor;
use water_futures::infrastructure::{
    CsvPriceHistorySource, HostedPredictorClient, SimulatedDroughtSource,
};

#[derive(Parser)]
#[command(author, version, about = "NQH2O water futures forecaster", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast one contract over the horizon
    Forecast {
        /// Contract code, e.g. NQH25
        #[arg(short, long)]
        contract: String,

        /// Days to forecast (default: FORECAST_HORIZON_DAYS)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        horizon: Option<u32>,
    },
    /// Blend hosted model, moving-average and trend curves for one contract
    Ensemble {
        /// Contract code, e.g. NQH25
        #[arg(short, long)]
        contract: String,

        /// Days to forecast (default: FORECAST_HORIZON_DAYS)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        horizon: Option<u32>,
    },
    /// Trading signals for a list of contracts
    Signals {
        /// Comma-separated contract codes (default: FORECAST_CONTRACTS)
        #[arg(short, long, value_delimiter = ',')]
        contracts: Vec<String>,

        /// Days to forecast (default: FORECAST_HORIZON_DAYS)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        horizon: Option<u32>,
    },
}

fn init_logging(format: LogFormat) {
    let filter =
        tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .pretty(),
            )
            .init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Prints the structured failure and turns it into a process error
fn report_failure(contract_code: &str, error: ForecastError) -> Result<()> {
    print_json(&ForecastFailure::new(contract_code, &error))?;
    bail!("{} failed at {} stage: {}", contract_code, error.stage(), error)
}

fn build_service(config: &Config) -> Result<ForecastService> {
    let prices = Arc::new(CsvPriceHistorySource::new(
        config.forecast.price_history_csv.clone(),
        config.forecast.history_window,
    ));
    let drought = Arc::new(SimulatedDroughtSource::default());
    let predictor = HostedPredictorClient::from_config(&config.predictor)?
        .map(|client| Arc::new(client) as Arc<dyn PointPredictor>);

    if predictor.is_none() {
        info!("PREDICTOR_ENDPOINT_URL not set; forecasts use the baseline blend");
    }

    Ok(ForecastService::new(prices, drought, predictor)
        .with_fallback(config.forecast.allow_fallback)
        .with_noise_seed(config.forecast.noise_seed))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_logging(config.observability.log_format);

    info!("Water Futures Forecaster {} starting...", env!("CARGO_PKG_VERSION"));
    let service = build_service(&config)?;
    let default_horizon = config.forecast.horizon_days;

    match cli.command {
        Commands::Forecast { contract, horizon } => {
            let contract = contract.to_uppercase();
            match service
                .forecast(&contract, horizon.unwrap_or(default_horizon))
                .await
            {
                Ok(forecast) => print_json(&forecast)?,
                Err(e) => report_failure(&contract, e)?,
            }
        }
        Commands::Ensemble { contract, horizon } => {
            let contract = contract.to_uppercase();
            match service
                .ensemble_forecast(&contract, horizon.unwrap_or(default_horizon))
                .await
            {
                Ok(ensemble) => print_json(&ensemble)?,
                Err(e) => report_failure(&contract, e)?,
            }
        }
        Commands::Signals { contracts, horizon } => {
            let contracts = if contracts.is_empty() {
                config.forecast.contracts.clone()
            } else {
                contracts
                    .iter()
                    .map(|c| c.trim().to_uppercase())
                    .filter(|c| !c.is_empty())
                    .collect()
            };
            let report = service
                .trading_signals(&contracts, horizon.unwrap_or(default_horizon))
                .await;
            print_json(&report)?;
        }
    }

    Ok(())
}

use crate::config::{Config, LogFormat};
use std::env;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::time::Duration;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

const VARS: [&str; 10] = [
    "PREDICTOR_ENDPOINT_URL",
    "PREDICTOR_API_TOKEN",
    "PREDICTOR_TIMEOUT_SECS",
    "FORECAST_HORIZON_DAYS",
    "FORECAST_CONTRACTS",
    "FORECAST_HISTORY_WINDOW",
    "FORECAST_ALLOW_FALLBACK",
    "FORECAST_NOISE_SEED",
    "PRICE_HISTORY_CSV",
    "LOG_FORMAT",
];

fn clear_env() {
    for var in VARS {
        unsafe { env::remove_var(var) };
    }
}

fn set(key: &str, value: &str) {
    unsafe { env::set_var(key, value) };
}

#[test]
fn test_config_defaults() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let config = Config::from_env().unwrap();

    assert!(config.predictor.endpoint_url.is_none());
    assert!(config.predictor.api_token.is_none());
    assert_eq!(config.predictor.timeout(), Duration::from_secs(20));
    assert_eq!(config.forecast.horizon_days, 7);
    assert_eq!(
        config.forecast.contracts,
        vec!["NQH25", "NQM25", "NQU25", "NQZ25"]
    );
    assert_eq!(config.forecast.history_window, 30);
    assert!(config.forecast.allow_fallback);
    assert!(config.forecast.noise_seed.is_none());
    assert_eq!(
        config.forecast.price_history_csv,
        PathBuf::from("data/water_futures_historical.csv")
    );
    assert_eq!(config.observability.log_format, LogFormat::Pretty);
}

#[test]
fn test_config_env_overrides() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    set("PREDICTOR_ENDPOINT_URL", "https://models.example.com/v1/predict");
    set("PREDICTOR_API_TOKEN", "secret");
    set("PREDICTOR_TIMEOUT_SECS", "15");
    set("FORECAST_HORIZON_DAYS", "14");
    set("FORECAST_CONTRACTS", "nqh25, NQZ25");
    set("FORECAST_HISTORY_WINDOW", "60");
    set("FORECAST_ALLOW_FALLBACK", "false");
    set("FORECAST_NOISE_SEED", "42");
    set("PRICE_HISTORY_CSV", "/tmp/prices.csv");
    set("LOG_FORMAT", "compact");

    let config = Config::from_env().unwrap();

    assert_eq!(
        config.predictor.endpoint_url.as_ref().map(|u| u.as_str()),
        Some("https://models.example.com/v1/predict")
    );
    assert_eq!(config.predictor.api_token.as_deref(), Some("secret"));
    assert_eq!(config.predictor.timeout_secs, 15);
    assert_eq!(config.forecast.horizon_days, 14);
    assert_eq!(config.forecast.contracts, vec!["NQH25", "NQZ25"]);
    assert_eq!(config.forecast.history_window, 60);
    assert!(!config.forecast.allow_fallback);
    assert_eq!(config.forecast.noise_seed, Some(42));
    assert_eq!(
        config.forecast.price_history_csv,
        PathBuf::from("/tmp/prices.csv")
    );
    assert_eq!(config.observability.log_format, LogFormat::Compact);

    clear_env();
}

#[test]
fn test_timeout_out_of_range_returns_error() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    for value in ["5", "31"] {
        set("PREDICTOR_TIMEOUT_SECS", value);
        let result = Config::from_env();
        assert!(result.is_err());
        let err_msg = format!("{:?}", result.err().unwrap());
        assert!(err_msg.contains("must be between 10 and 30"));
    }

    clear_env();
}

#[test]
fn test_invalid_values_return_error() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());

    for (key, value) in [
        ("PREDICTOR_ENDPOINT_URL", "not a url"),
        ("FORECAST_HORIZON_DAYS", "0"),
        ("FORECAST_HORIZON_DAYS", "week"),
        ("FORECAST_CONTRACTS", " , "),
        ("FORECAST_NOISE_SEED", "-1"),
        ("FORECAST_ALLOW_FALLBACK", "False"),
        ("FORECAST_ALLOW_FALLBACK", "no"),
        ("FORECAST_HISTORY_WINDOW", "0"),
        ("FORECAST_HISTORY_WINDOW", "11"),
        ("LOG_FORMAT", "xml"),
    ] {
        clear_env();
        set(key, value);
        assert!(Config::from_env().is_err(), "{}={} should fail", key, value);
    }

    clear_env();
}

#[test]
fn test_empty_token_is_ignored() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    set("PREDICTOR_API_TOKEN", "");

    let config = Config::from_env().unwrap();
    assert!(config.predictor.api_token.is_none());

    clear_env();
}

#[test]
fn test_history_window_lower_bound() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    set("FORECAST_HISTORY_WINDOW", "12");
    assert_eq!(Config::from_env().unwrap().forecast.history_window, 12);

    set("FORECAST_HISTORY_WINDOW", "5");
    let err_msg = format!("{:?}", Config::from_env().err().unwrap());
    assert!(err_msg.contains("FORECAST_HISTORY_WINDOW must be at least 12"));

    clear_env();
}

// Drought conditions
pub mod drought;

// Forecast curves and predictions
pub mod forecast;

// Market data
pub mod market;

// Model feature registry
pub mod ml;

// Port interfaces
pub mod ports;

// Trading signals
pub mod signal;

// Domain-specific error types
pub mod errors;

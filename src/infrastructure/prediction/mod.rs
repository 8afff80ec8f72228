pub mod envelope;
pub mod hosted_predictor;

pub use hosted_predictor::HostedPredictorClient;

pub mod core;
pub mod mock;
pub mod persistence;
pub mod prediction;
pub mod repositories;

pub use mock::{MockPredictor, SimulatedDroughtSource};
pub use persistence::CsvPriceHistorySource;
pub use prediction::HostedPredictorClient;
pub use repositories::InMemoryPriceHistorySource;

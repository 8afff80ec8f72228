pub mod baselines;
pub mod ensemble;
pub mod explanation;
pub mod horizon;

pub use ensemble::EnsembleBlender;
pub use horizon::HorizonExpander;

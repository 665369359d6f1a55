pub mod analytic;
pub mod common;
pub mod error;
pub mod simulation;

pub use common::cancel::CancellationToken;
pub use common::models::{DerivativeParameter, MarketInputs, OptionKind};
pub use error::PricingError;
pub use simulation::estimator::{EstimatorConfig, McEstimate, MonteCarloEstimator, TRIAL_COUNT};

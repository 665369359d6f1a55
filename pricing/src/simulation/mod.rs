pub mod estimator;
pub mod gaussian;
pub mod gbm;
pub mod payoff;

pub use estimator::{EstimatorConfig, McEstimate, MonteCarloEstimator};
pub use gaussian::BoxMullerPolar;
pub use gbm::GeometricBrownianMotion;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("{0} is not representable as a finite number")]
    NotRepresentable(String),

    #[error("all {rejected} trials produced non-finite values")]
    NoFiniteTrials { rejected: u64 },

    #[error("simulation cancelled")]
    Cancelled,

    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),
}

use mc_pricing::PricingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("invalid parameter {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error(transparent)]
    Pricing(PricingError),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<PricingError> for ScenarioError {
    fn from(e: PricingError) -> Self {
        match e {
            PricingError::InvalidParameter { name, reason } => {
                ScenarioError::InvalidParameter { field: name, reason }
            }
            other => ScenarioError::Pricing(other),
        }
    }
}

impl From<rusqlite::Error> for ScenarioError {
    fn from(e: rusqlite::Error) -> Self {
        ScenarioError::Storage(e.to_string())
    }
}

impl ScenarioError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScenarioError::Pricing(PricingError::Cancelled))
    }
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;

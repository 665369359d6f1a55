use chrono::NaiveDate;
use mc_pricing::{MarketInputs, OptionKind};

use crate::error::{ScenarioError, ScenarioResult};

/// A contract as submitted for pricing.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractParameters {
    pub contract_id: String,
    pub kind: OptionKind,
    pub market: MarketInputs,
    pub expiry_date: NaiveDate,
    /// None prices as of the engine clock's today
    pub evaluation_date: Option<NaiveDate>,
}

impl ContractParameters {
    pub fn new(
        contract_id: impl Into<String>,
        kind: OptionKind,
        market: MarketInputs,
        expiry_date: NaiveDate,
    ) -> Self {
        Self {
            contract_id: contract_id.into(),
            kind,
            market,
            expiry_date,
            evaluation_date: None,
        }
    }

    pub fn evaluated_on(mut self, evaluation_date: NaiveDate) -> Self {
        self.evaluation_date = Some(evaluation_date);
        self
    }

    pub fn validate(&self) -> ScenarioResult<()> {
        if self.contract_id.is_empty() {
            return Err(ScenarioError::InvalidParameter {
                field: "contract_id",
                reason: "must not be empty".to_string(),
            });
        }
        if self.contract_id.chars().any(char::is_whitespace) {
            return Err(ScenarioError::InvalidParameter {
                field: "contract_id",
                reason: format!("must not contain white space, got {:?}", self.contract_id),
            });
        }
        self.market.validate()?;
        Ok(())
    }
}

/// Whole days from `evaluation_date` to `expiry_date`; zero or negative once expired.
pub fn day_count(evaluation_date: NaiveDate, expiry_date: NaiveDate) -> i64 {
    (expiry_date - evaluation_date).num_days()
}

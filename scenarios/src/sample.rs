use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::sweep::SweepState;

/// One priced day of one scenario curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedSample {
    /// days after the evaluation date, starting at 1
    pub day_offset: u32,
    pub calendar_date: NaiveDate,
    /// rounded to 2 dp
    pub price: Decimal,
    pub variation: String,
}

/// Tag of the sweep iteration a curve belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariationLabel {
    Original,
    Variation { index: usize, state: SweepState },
}

impl fmt::Display for VariationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariationLabel::Original => write!(f, "ORIGINAL"),
            VariationLabel::Variation { index, state } => write!(
                f,
                "VARIATION{} CURR: {:.2} SP: {:.2} RFR: {:.2}% IV: {:.2}%",
                index,
                state.current_price.round_dp(2),
                state.strike_price.round_dp(2),
                state.risk_free_rate.round_dp(2),
                state.implied_volatility.round_dp(2)
            ),
        }
    }
}

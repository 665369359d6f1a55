use mc_pricing::{MarketInputs, OptionKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::sample::VariationLabel;

/// Curves produced per contract: the original plus two variations.
pub const SWEEP_ITERATIONS: usize = 3;

/// Additive deltas one transition applies to the working state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepRule {
    pub current_price: Decimal,
    pub strike_price: Decimal,
    /// percentage points
    pub risk_free_rate: Decimal,
    /// percentage points
    pub implied_volatility: Decimal,
}

/// Replacement values for parameters a rule pushed out of range. Volatility always
/// floors at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampFloors {
    /// used when the current price drops to zero or below
    pub current_price: Decimal,
    /// used when the strike drops to zero or below
    pub strike_price: Decimal,
    /// used when the rate turns negative
    pub risk_free_rate: Decimal,
}

/// Perturbation rules of one option kind: `even` moves the state out of an even
/// iteration, `odd` out of an odd one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleTable {
    pub even: SweepRule,
    pub odd: SweepRule,
    pub floors: ClampFloors,
}

pub static CALL_RULES: RuleTable = RuleTable {
    even: SweepRule {
        current_price: dec!(3.21),
        strike_price: dec!(-1.50),
        risk_free_rate: dec!(-0.01),
        implied_volatility: dec!(5.00),
    },
    odd: SweepRule {
        current_price: dec!(-1.00),
        strike_price: dec!(0.50),
        risk_free_rate: dec!(0.02),
        implied_volatility: dec!(-5.00),
    },
    floors: ClampFloors {
        current_price: dec!(3.00),
        strike_price: dec!(5.00),
        risk_free_rate: dec!(1.00),
    },
};

pub static PUT_RULES: RuleTable = RuleTable {
    even: SweepRule {
        current_price: dec!(1.75),
        strike_price: dec!(-0.75),
        risk_free_rate: dec!(-0.01),
        implied_volatility: dec!(12.25),
    },
    odd: SweepRule {
        current_price: dec!(-1.00),
        strike_price: dec!(2.50),
        risk_free_rate: dec!(0.02),
        implied_volatility: dec!(-7.25),
    },
    floors: ClampFloors {
        current_price: dec!(3.00),
        strike_price: dec!(5.00),
        risk_free_rate: dec!(1.00),
    },
};

impl RuleTable {
    pub fn for_kind(kind: OptionKind) -> &'static RuleTable {
        match kind {
            OptionKind::Call => &CALL_RULES,
            OptionKind::Put => &PUT_RULES,
        }
    }

    pub fn rule_for(&self, iteration: usize) -> &SweepRule {
        if iteration % 2 == 0 {
            &self.even
        } else {
            &self.odd
        }
    }
}

/// Working copy of the market parameters, passed by value from one iteration to the
/// next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepState {
    pub current_price: Decimal,
    pub strike_price: Decimal,
    pub risk_free_rate: Decimal,
    pub implied_volatility: Decimal,
}

impl From<MarketInputs> for SweepState {
    fn from(market: MarketInputs) -> Self {
        Self {
            current_price: market.current_price,
            strike_price: market.strike_price,
            risk_free_rate: market.risk_free_rate,
            implied_volatility: market.implied_volatility,
        }
    }
}

impl SweepState {
    pub fn market_inputs(&self) -> MarketInputs {
        MarketInputs::new(
            self.current_price,
            self.strike_price,
            self.risk_free_rate,
            self.implied_volatility,
        )
    }

    /// Applies `rule`, then pulls every parameter back into its valid range.
    pub fn perturbed(self, rule: &SweepRule, floors: &ClampFloors) -> SweepState {
        SweepState {
            current_price: self.current_price + rule.current_price,
            strike_price: self.strike_price + rule.strike_price,
            risk_free_rate: self.risk_free_rate + rule.risk_free_rate,
            implied_volatility: self.implied_volatility + rule.implied_volatility,
        }
        .clamped(floors)
    }

    fn clamped(self, floors: &ClampFloors) -> SweepState {
        SweepState {
            current_price: if self.current_price <= Decimal::ZERO {
                floors.current_price
            } else {
                self.current_price
            },
            strike_price: if self.strike_price <= Decimal::ZERO {
                floors.strike_price
            } else {
                self.strike_price
            },
            risk_free_rate: if self.risk_free_rate < Decimal::ZERO {
                floors.risk_free_rate
            } else {
                self.risk_free_rate
            },
            implied_volatility: self.implied_volatility.max(Decimal::ZERO),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepPhase {
    Init,
    Iterating(usize),
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepIteration {
    pub index: usize,
    pub state: SweepState,
    pub label: VariationLabel,
}

/// Yields the parameter set of every sweep iteration in order. Moving from iteration
/// `i` to `i + 1` applies the rule for `i`'s parity from the kind's table.
#[derive(Debug, Clone)]
pub struct SweepGenerator {
    table: &'static RuleTable,
    state: SweepState,
    phase: SweepPhase,
    iterations: usize,
}

impl SweepGenerator {
    pub fn new(kind: OptionKind, market: MarketInputs) -> Self {
        Self::with_iterations(kind, market, SWEEP_ITERATIONS)
    }

    pub fn with_iterations(kind: OptionKind, market: MarketInputs, iterations: usize) -> Self {
        Self {
            table: RuleTable::for_kind(kind),
            state: SweepState::from(market),
            phase: SweepPhase::Init,
            iterations,
        }
    }

    pub fn phase(&self) -> SweepPhase {
        self.phase
    }

    fn emit(&self, index: usize) -> SweepIteration {
        let label = if index == 0 {
            VariationLabel::Original
        } else {
            VariationLabel::Variation {
                index,
                state: self.state,
            }
        };
        SweepIteration {
            index,
            state: self.state,
            label,
        }
    }
}

impl Iterator for SweepGenerator {
    type Item = SweepIteration;

    fn next(&mut self) -> Option<SweepIteration> {
        let next_index = match self.phase {
            SweepPhase::Init => 0,
            SweepPhase::Iterating(current) => current + 1,
            SweepPhase::Done => return None,
        };
        if next_index >= self.iterations {
            self.phase = SweepPhase::Done;
            return None;
        }

        if let SweepPhase::Iterating(current) = self.phase {
            self.state = self
                .state
                .perturbed(self.table.rule_for(current), &self.table.floors);
        }
        self.phase = SweepPhase::Iterating(next_index);
        Some(self.emit(next_index))
    }
}

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::common::numeric::PayoffValue;
use crate::error::PricingError;
use crate::simulation::payoff::{call_payoff, put_payoff};

/// Length of the pricing year in days; leap years count 365 as well.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Upper bound for the implied volatility, in percent.
pub const MAX_VOLATILITY_PCT: Decimal = Decimal::ONE_THOUSAND;

/// Upper bound for the risk-free rate, in percent. The lower bound is zero.
pub const MAX_RATE_PCT: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    pub fn payoff<N: PayoffValue>(&self, asset_price: N, strike: N) -> N {
        match self {
            OptionKind::Call => call_payoff(asset_price, strike),
            OptionKind::Put => put_payoff(asset_price, strike),
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKind::Call => write!(f, "Call"),
            OptionKind::Put => write!(f, "Put"),
        }
    }
}

impl FromStr for OptionKind {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(OptionKind::Call),
            "put" | "p" => Ok(OptionKind::Put),
            other => Err(PricingError::InvalidParameter {
                name: "kind",
                reason: format!("expected call or put, got {other:?}"),
            }),
        }
    }
}

/// Annualized model parameters, all as fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivativeParameter {
    /// the asset's price at time t
    pub asset_price: f64,
    /// the strike or exercise price of the asset
    pub strike: f64,
    /// (T - t) in years, where T is the time of the option's expiration and t is the current time
    pub time_to_expiration: f64,
    /// the annualized risk-free interest rate
    pub rfr: f64,
    /// the annualized standard deviation of the stock's returns
    pub vola: f64,
}

impl DerivativeParameter {
    pub fn new(
        asset_price: f64,
        strike: f64,
        time_to_expiration: f64,
        rfr: f64,
        vola: f64,
    ) -> Self {
        Self {
            asset_price,
            strike,
            time_to_expiration,
            rfr,
            vola,
        }
    }

    pub fn discount_factor(&self) -> f64 {
        (-self.rfr * self.time_to_expiration).exp()
    }
}

/// Market side of a contract as quoted: prices in currency units, rate and volatility in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketInputs {
    pub current_price: Decimal,
    pub strike_price: Decimal,
    /// percent, 1.00 means 1%
    pub risk_free_rate: Decimal,
    /// percent, never negative
    pub implied_volatility: Decimal,
}

impl MarketInputs {
    pub fn new(
        current_price: Decimal,
        strike_price: Decimal,
        risk_free_rate: Decimal,
        implied_volatility: Decimal,
    ) -> Self {
        Self {
            current_price,
            strike_price,
            risk_free_rate,
            implied_volatility,
        }
    }

    /// Checks quoted inputs: the model domain plus the accepted quote ranges
    /// (rate within [0%, 100%], volatility at most 1000%).
    pub fn validate(&self) -> Result<(), PricingError> {
        self.check_domain()?;
        if self.implied_volatility > MAX_VOLATILITY_PCT {
            return Err(invalid(
                "implied_volatility",
                "exceeds 1000%",
                self.implied_volatility,
            ));
        }
        if self.risk_free_rate > MAX_RATE_PCT {
            return Err(invalid(
                "risk_free_rate",
                "must lie within [0%, 100%]",
                self.risk_free_rate,
            ));
        }
        Ok(())
    }

    /// Checks only what the model needs: positive prices, non-negative rate and
    /// volatility. Derived parameter sets may leave the quote ranges.
    pub fn check_domain(&self) -> Result<(), PricingError> {
        if self.current_price <= Decimal::ZERO {
            return Err(invalid("current_price", "must be positive", self.current_price));
        }
        if self.strike_price <= Decimal::ZERO {
            return Err(invalid("strike_price", "must be positive", self.strike_price));
        }
        if self.implied_volatility < Decimal::ZERO {
            return Err(invalid(
                "implied_volatility",
                "must not be negative",
                self.implied_volatility,
            ));
        }
        if self.risk_free_rate < Decimal::ZERO {
            return Err(invalid(
                "risk_free_rate",
                "must lie within [0%, 100%]",
                self.risk_free_rate,
            ));
        }
        Ok(())
    }

    /// Converts to model units for a horizon of `day` days.
    pub fn derivative_parameter(&self, day: u32) -> Result<DerivativeParameter, PricingError> {
        Ok(DerivativeParameter::new(
            to_f64("current_price", self.current_price)?,
            to_f64("strike_price", self.strike_price)?,
            year_fraction(day),
            to_f64("risk_free_rate", self.risk_free_rate / Decimal::ONE_HUNDRED)?,
            to_f64("implied_volatility", self.implied_volatility / Decimal::ONE_HUNDRED)?,
        ))
    }
}

pub fn year_fraction(day: u32) -> f64 {
    f64::from(day) / DAYS_PER_YEAR
}

fn to_f64(name: &str, value: Decimal) -> Result<f64, PricingError> {
    value
        .to_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PricingError::NotRepresentable(format!("{name} = {value}")))
}

fn invalid(name: &'static str, reason: &str, value: Decimal) -> PricingError {
    PricingError::InvalidParameter {
        name,
        reason: format!("{reason}, got {value}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rust_decimal_macros::dec;

    fn inputs() -> MarketInputs {
        MarketInputs::new(dec!(130.72), dec!(130.00), dec!(0.93), dec!(20.00))
    }

    #[test]
    fn percent_inputs_become_fractions() {
        let dp = inputs().derivative_parameter(73).unwrap();
        assert_approx_eq!(dp.asset_price, 130.72);
        assert_approx_eq!(dp.strike, 130.0);
        assert_approx_eq!(dp.rfr, 0.0093);
        assert_approx_eq!(dp.vola, 0.2);
        assert_approx_eq!(dp.time_to_expiration, 0.2);
    }

    #[test]
    fn rejects_non_positive_prices() {
        let mut market = inputs();
        market.current_price = Decimal::ZERO;
        assert!(matches!(
            market.validate(),
            Err(PricingError::InvalidParameter { name: "current_price", .. })
        ));

        let mut market = inputs();
        market.strike_price = dec!(-1);
        assert!(matches!(
            market.validate(),
            Err(PricingError::InvalidParameter { name: "strike_price", .. })
        ));
    }

    #[test]
    fn volatility_and_rate_ranges() {
        let mut market = inputs();
        market.implied_volatility = Decimal::ZERO;
        assert!(market.validate().is_ok());

        market.implied_volatility = dec!(-0.01);
        assert!(market.validate().is_err());

        let mut market = inputs();
        market.risk_free_rate = dec!(100.01);
        assert!(market.validate().is_err());
        market.risk_free_rate = dec!(-0.5);
        assert!(market.validate().is_err());
    }

    #[test]
    fn domain_check_ignores_quote_ceilings() {
        let market = MarketInputs::new(dec!(100), dec!(100), dec!(100.01), dec!(1005));
        assert!(market.check_domain().is_ok());
        assert!(matches!(
            market.validate(),
            Err(PricingError::InvalidParameter { name: "implied_volatility", .. })
        ));

        let mut negative = market;
        negative.risk_free_rate = dec!(-0.01);
        assert!(negative.check_domain().is_err());
    }

    #[test]
    fn option_kind_from_str() {
        assert_eq!("Call".parse::<OptionKind>().unwrap(), OptionKind::Call);
        assert_eq!(" put ".parse::<OptionKind>().unwrap(), OptionKind::Put);
        assert!("straddle".parse::<OptionKind>().is_err());
    }
}

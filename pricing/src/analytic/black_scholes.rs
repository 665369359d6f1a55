use crate::common::models::{DerivativeParameter, OptionKind};
use probability::distribution::{Distribution, Gaussian};

pub(crate) fn cdf(d: f64) -> f64 {
    let normal = Gaussian::new(0.0, 1.0);
    normal.distribution(d)
}

pub trait OptionPrice {
    type Params;
    fn put(params: &Self::Params) -> f64;
    fn call(params: &Self::Params) -> f64;

    fn price(kind: OptionKind, params: &Self::Params) -> f64 {
        match kind {
            OptionKind::Call => Self::call(params),
            OptionKind::Put => Self::put(params),
        }
    }
}

/// European Put and Call option prices for stocks.
/// https://en.wikipedia.org/wiki/Black-Scholes_model
///
/// Serves as the closed-form reference for the Monte Carlo estimator.
pub struct BlackScholesMerton;

impl BlackScholesMerton {
    /// Without diffusion the terminal price is the forward; the option is worth its
    /// discounted intrinsic value against it.
    fn degenerate(dp: &DerivativeParameter) -> Option<(f64, f64)> {
        let sigma_exp = dp.vola * dp.time_to_expiration.sqrt();
        if sigma_exp > 0.0 {
            return None;
        }
        let forward = dp.asset_price * (dp.rfr * dp.time_to_expiration).exp();
        let disc = dp.discount_factor();
        Some((
            (forward - dp.strike).max(0.0) * disc,
            (dp.strike - forward).max(0.0) * disc,
        ))
    }

    fn d1_d2(dp: &DerivativeParameter) -> (f64, f64) {
        let sigma_exp = dp.vola * dp.time_to_expiration.sqrt();
        let d1 = ((dp.asset_price / dp.strike).ln()
            + (dp.rfr + dp.vola.powi(2) / 2.0) * dp.time_to_expiration)
            / sigma_exp;
        (d1, d1 - sigma_exp)
    }
}

impl OptionPrice for BlackScholesMerton {
    type Params = DerivativeParameter;

    fn call(dp: &DerivativeParameter) -> f64 {
        if let Some((call, _)) = Self::degenerate(dp) {
            return call;
        }
        let (d1, d2) = Self::d1_d2(dp);
        cdf(d1) * dp.asset_price - cdf(d2) * dp.strike * dp.discount_factor()
    }

    fn put(dp: &DerivativeParameter) -> f64 {
        if let Some((_, put)) = Self::degenerate(dp) {
            return put;
        }
        let (d1, d2) = Self::d1_d2(dp);
        cdf(-d2) * dp.strike * dp.discount_factor() - cdf(-d1) * dp.asset_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const TOLERANCE: f64 = 1e-4;

    #[test]
    fn normal_cdf() {
        let center_value = cdf(0.0);
        assert_eq!(center_value, 0.5);

        let sigma_top = cdf(1.0); // mu + 1 sigma
        assert_approx_eq!(sigma_top, 0.8413, 0.0001); // table value for 1.0
    }

    #[test]
    fn european_call() {
        let dp = DerivativeParameter::new(300.0, 250.0, 1.0, 0.03, 0.15);
        assert_approx_eq!(BlackScholesMerton::call(&dp), 58.8197, TOLERANCE);

        let dp = DerivativeParameter::new(310.0, 250.0, 3.5, 0.05, 0.25);
        assert_approx_eq!(BlackScholesMerton::call(&dp), 113.4155, TOLERANCE);
    }

    #[test]
    fn european_put() {
        let dp = DerivativeParameter::new(300.0, 250.0, 1.0, 0.03, 0.15);
        assert_approx_eq!(BlackScholesMerton::put(&dp), 1.4311, TOLERANCE);

        let dp = DerivativeParameter::new(310.0, 250.0, 3.5, 0.05, 0.25);
        assert_approx_eq!(BlackScholesMerton::price(OptionKind::Put, &dp), 13.2797, TOLERANCE);
    }

    #[test]
    fn european_put_call_parity() {
        let dp = DerivativeParameter::new(300.0, 250.0, 1.0, 0.03, 0.15);
        let put_call_parity = BlackScholesMerton::call(&dp) - BlackScholesMerton::put(&dp);
        assert_approx_eq!(
            put_call_parity,
            dp.asset_price - dp.strike * dp.discount_factor(),
            1e-9
        );
    }

    #[test]
    fn zero_volatility_is_discounted_forward_intrinsic() {
        let dp = DerivativeParameter::new(130.72, 130.0, 10.0 / 365.0, 0.0093, 0.0);
        assert_approx_eq!(BlackScholesMerton::call(&dp), 0.7531, TOLERANCE);
        assert_eq!(BlackScholesMerton::put(&dp), 0.0);
    }
}

use rand::Rng;
use rand_distr::Distribution;

use crate::common::models::DerivativeParameter;
use crate::simulation::gaussian::BoxMullerPolar;

/// Model params for the SDE
/// '''math
/// dS_t / S_t = mu dt + sigma dW_t
/// ''', where $dW_t ~ N(0, sqrt(dt))$
/// https://en.wikipedia.org/wiki/Geometric_Brownian_motion
///
/// Only the terminal value after `t` years is drawn, in one exact step:
/// $S_t = S_0 exp((mu - sigma^2 / 2) t + sigma sqrt(t) Z)$.
#[derive(Debug, Clone, Copy)]
pub struct GeometricBrownianMotion {
    initial_value: f64,
    /// (mu - sigma^2 / 2) * t
    drift: f64,
    /// sigma * sqrt(t)
    diffusion: f64,
}

impl GeometricBrownianMotion {
    pub fn new(initial_value: f64, mu: f64, sigma: f64, t: f64) -> Self {
        Self {
            initial_value,
            drift: (mu - 0.5 * sigma * sigma) * t,
            diffusion: sigma * t.sqrt(),
        }
    }

    /// Terminal value for a given standard normal draw.
    #[inline]
    pub fn terminal_value(&self, z: f64) -> f64 {
        self.initial_value * self.diffusion.mul_add(z, self.drift).exp()
    }
}

impl From<&DerivativeParameter> for GeometricBrownianMotion {
    fn from(dp: &DerivativeParameter) -> Self {
        // under the risk neutral measure we have mu = r
        GeometricBrownianMotion::new(dp.asset_price, dp.rfr, dp.vola, dp.time_to_expiration)
    }
}

impl Distribution<f64> for GeometricBrownianMotion {
    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.terminal_value(BoxMullerPolar.sample(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::SeedableRng;
    use rand_hc::Hc128Rng;

    #[test]
    fn zero_volatility_is_pure_drift() {
        let gbm = GeometricBrownianMotion::new(100.0, 0.05, 0.0, 2.0);
        let expected = 100.0 * (0.1_f64).exp();
        assert_approx_eq!(gbm.terminal_value(0.0), expected, 1e-12);
        assert_approx_eq!(gbm.terminal_value(3.7), expected, 1e-12);
    }

    #[test]
    fn zero_time_returns_initial_value() {
        let gbm = GeometricBrownianMotion::new(42.0, 0.05, 0.3, 0.0);
        assert_eq!(gbm.terminal_value(1.5), 42.0);
    }

    #[test]
    fn log_return_moments() {
        let s0 = 100.0;
        let (mu, sigma, t) = (-0.2, 0.4, 5.0);
        let gbm = GeometricBrownianMotion::new(s0, mu, sigma, t);
        let mut rn_generator = Hc128Rng::seed_from_u64(53);

        let nr_samples = 100_000;
        let avg_delta = (&mut rn_generator)
            .sample_iter(gbm)
            .take(nr_samples)
            .map(|p| (p / s0).ln())
            .sum::<f64>()
            / nr_samples as f64;

        // expected value should equal analytic solution
        let exp_delta = t * (mu - sigma * sigma / 2.0);
        assert_approx_eq!(avg_delta, exp_delta, 1e-1);
    }

    #[test]
    fn risk_neutral_mean_grows_at_the_rate() {
        let dp = DerivativeParameter::new(100.0, 100.0, 1.0, 0.03, 0.25);
        let gbm = GeometricBrownianMotion::from(&dp);
        let mut rn_generator = Hc128Rng::seed_from_u64(1);

        let nr_samples = 200_000;
        let mean = (&mut rn_generator)
            .sample_iter(gbm)
            .take(nr_samples)
            .sum::<f64>()
            / nr_samples as f64;

        assert_approx_eq!(mean, 100.0 * (0.03_f64).exp(), 0.3);
    }
}

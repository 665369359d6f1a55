use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_distr::Distribution;
use rand_hc::Hc128Rng;
use rayon::prelude::*;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::common::cancel::CancellationToken;
use crate::common::models::{DerivativeParameter, MarketInputs, OptionKind};
use crate::error::PricingError;
use crate::simulation::gbm::GeometricBrownianMotion;

/// Number of independent trials behind every price.
pub const TRIAL_COUNT: u64 = 1_000_000;

pub const DEFAULT_BATCH_SIZE: u64 = 16_384;

#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    /// Number of worker threads (None = rayon's global pool)
    pub workers: Option<usize>,
    /// Base seed; with None every estimate draws a fresh one from the thread rng
    pub seed: Option<u64>,
    /// Trials simulated by one worker with one generator before the cancellation flag
    /// is polled again
    pub batch_size: u64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            workers: None,
            seed: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// One day's estimate: the rounded price plus what it was computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McEstimate {
    /// discounted mean payoff, rounded half-to-even to 2 dp
    pub price: Decimal,
    pub discounted_mean: f64,
    pub standard_error: f64,
    pub accepted_trials: u64,
    /// trials whose terminal price or payoff was not finite
    pub rejected_trials: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct BatchSummary {
    sum: f64,
    sum_sq: f64,
    accepted: u64,
    rejected: u64,
}

impl BatchSummary {
    fn merge(self, other: BatchSummary) -> BatchSummary {
        BatchSummary {
            sum: self.sum + other.sum,
            sum_sq: self.sum_sq + other.sum_sq,
            accepted: self.accepted + other.accepted,
            rejected: self.rejected + other.rejected,
        }
    }
}

/// Prices a vanilla European option for one horizon by averaging discounted payoffs of
/// independent terminal GBM draws.
///
/// Trials are split into batches; every batch runs on the worker pool with its own
/// `Hc128Rng`, seeded once from (base seed, stream, batch index). Batch sums are
/// reduced in batch order, so a seeded estimator gives the same answer for any
/// number of workers.
#[derive(Debug, Clone)]
pub struct MonteCarloEstimator {
    nr_trials: u64,
    batch_size: u64,
    seed: Option<u64>,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl MonteCarloEstimator {
    pub fn new(config: &EstimatorConfig) -> Result<Self, PricingError> {
        if config.batch_size == 0 {
            return Err(PricingError::InvalidParameter {
                name: "batch_size",
                reason: "must be positive".to_string(),
            });
        }

        let pool = match config.workers {
            Some(0) => {
                return Err(PricingError::InvalidParameter {
                    name: "workers",
                    reason: "must be positive".to_string(),
                })
            }
            Some(n_workers) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n_workers)
                    .thread_name(|idx| format!("mc-worker-{idx}"))
                    .build()
                    .map_err(|e| PricingError::WorkerPool(e.to_string()))?;
                Some(Arc::new(pool))
            }
            None => None,
        };

        Ok(Self {
            nr_trials: TRIAL_COUNT,
            batch_size: config.batch_size,
            seed: config.seed,
            pool,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_trials(mut self, nr_trials: u64) -> Self {
        self.nr_trials = nr_trials;
        self
    }

    /// Rounded price for `day` days to expiry.
    pub fn price(
        &self,
        kind: OptionKind,
        market: &MarketInputs,
        day: u32,
        cancel: &CancellationToken,
    ) -> Result<Decimal, PricingError> {
        market.validate()?;
        self.estimate(kind, market, day, 0, cancel)
            .map(|estimate| estimate.price)
    }

    /// Full estimate for `day` days to expiry. `stream` selects the random stream of a
    /// seeded estimator; distinct estimates of one run should use distinct streams.
    ///
    /// Only the model domain of `market` is checked here, quote ranges are left to
    /// the caller.
    pub fn estimate(
        &self,
        kind: OptionKind,
        market: &MarketInputs,
        day: u32,
        stream: u64,
        cancel: &CancellationToken,
    ) -> Result<McEstimate, PricingError> {
        market.check_domain()?;
        cancel.check()?;

        let params = market.derivative_parameter(day)?;
        let gbm = GeometricBrownianMotion::from(&params);
        let base_seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let batches = self.batch_sizes();

        let summaries = self.in_pool(|| {
            batches
                .par_iter()
                .enumerate()
                .map(|(idx, &nr_trials)| -> Result<BatchSummary, PricingError> {
                    cancel.check()?;
                    let seed = batch_seed(base_seed, stream, idx as u64);
                    Ok(simulate_batch(kind, &gbm, params.strike, nr_trials, seed))
                })
                .collect::<Result<Vec<BatchSummary>, PricingError>>()
        })?;

        let total = summaries
            .into_iter()
            .fold(BatchSummary::default(), BatchSummary::merge);
        let estimate = summarize(total, &params)?;

        tracing::debug!(
            kind = %kind,
            day,
            price = %estimate.price,
            standard_error = estimate.standard_error,
            "estimated option price"
        );
        Ok(estimate)
    }

    /// Runs `op` on the estimator's worker pool, or on rayon's global pool when none
    /// was configured. Parallel iterators inside `op` use that pool.
    pub fn in_pool<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    fn batch_sizes(&self) -> Vec<u64> {
        let full = self.nr_trials / self.batch_size;
        let remainder = self.nr_trials % self.batch_size;

        let mut sizes: Vec<u64> = (0..full).map(|_| self.batch_size).collect();
        if remainder > 0 {
            sizes.push(remainder);
        }
        sizes
    }
}

fn simulate_batch(
    kind: OptionKind,
    gbm: &GeometricBrownianMotion,
    strike: f64,
    nr_trials: u64,
    seed: u64,
) -> BatchSummary {
    let mut rn_generator = Hc128Rng::seed_from_u64(seed);
    let mut summary = BatchSummary::default();

    for _ in 0..nr_trials {
        let asset_price = gbm.sample(&mut rn_generator);
        if !asset_price.is_finite() {
            summary.rejected += 1;
            continue;
        }
        let payoff = kind.payoff(asset_price, strike);
        if !payoff.is_finite() {
            summary.rejected += 1;
            continue;
        }
        summary.sum += payoff;
        summary.sum_sq += payoff * payoff;
        summary.accepted += 1;
    }
    summary
}

fn summarize(
    total: BatchSummary,
    params: &DerivativeParameter,
) -> Result<McEstimate, PricingError> {
    if total.rejected > 0 {
        tracing::warn!(
            rejected = total.rejected,
            accepted = total.accepted,
            "excluded non-finite trials from the estimate"
        );
    }
    if total.accepted == 0 {
        return Err(PricingError::NoFiniteTrials {
            rejected: total.rejected,
        });
    }

    let n = total.accepted as f64;
    let mean = total.sum / n;
    let variance = (total.sum_sq / n - mean * mean).max(0.0);
    let disc_factor = params.discount_factor();
    let discounted_mean = mean * disc_factor;

    let price = Decimal::from_f64(discounted_mean)
        .ok_or_else(|| PricingError::NotRepresentable(format!("estimate {discounted_mean}")))?
        .round_dp(2);

    Ok(McEstimate {
        price,
        discounted_mean,
        standard_error: disc_factor * (variance / n).sqrt(),
        accepted_trials: total.accepted,
        rejected_trials: total.rejected,
    })
}

/// Decorrelates (base, stream, batch) into one generator seed.
fn batch_seed(base_seed: u64, stream: u64, batch: u64) -> u64 {
    splitmix64(splitmix64(base_seed ^ splitmix64(stream)).wrapping_add(batch))
}

#[inline]
fn splitmix64(state: u64) -> u64 {
    let mut z = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

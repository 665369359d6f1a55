use chrono::{Days, NaiveDate};
use mc_pricing::{CancellationToken, MarketInputs, MonteCarloEstimator, OptionKind};

use crate::contract::day_count;
use crate::error::{ScenarioError, ScenarioResult};
use crate::sample::PricedSample;

/// Random stream of the estimate for `day` within sweep iteration `iteration`.
pub fn stream_key(iteration: usize, day: u32) -> u64 {
    ((iteration as u64) << 32) | u64::from(day)
}

/// Prices one contract for every day between the evaluation date and expiry.
pub struct TermStructureBuilder<'a> {
    estimator: &'a MonteCarloEstimator,
    cancel: &'a CancellationToken,
}

impl<'a> TermStructureBuilder<'a> {
    pub fn new(estimator: &'a MonteCarloEstimator, cancel: &'a CancellationToken) -> Self {
        Self { estimator, cancel }
    }

    /// One sample per day offset `1..=day_count`, in increasing order. Empty when the
    /// contract has already expired. `market` may be a swept parameter set, so only
    /// its model domain is checked.
    pub fn build(
        &self,
        kind: OptionKind,
        market: &MarketInputs,
        evaluation_date: NaiveDate,
        expiry_date: NaiveDate,
        label: &str,
        iteration: usize,
    ) -> ScenarioResult<Vec<PricedSample>> {
        market.check_domain()?;

        let days = day_count(evaluation_date, expiry_date);
        if days <= 0 {
            tracing::info!(%evaluation_date, %expiry_date, "contract expired, nothing to price");
            return Ok(Vec::new());
        }
        let days = u32::try_from(days).map_err(|_| ScenarioError::InvalidParameter {
            field: "expiry_date",
            reason: format!("{days} days to expiry is out of range"),
        })?;

        let mut samples = Vec::with_capacity(days as usize);
        for day in 1..=days {
            self.cancel.check()?;
            let estimate =
                self.estimator
                    .estimate(kind, market, day, stream_key(iteration, day), self.cancel)?;
            let calendar_date = evaluation_date
                .checked_add_days(Days::new(u64::from(day)))
                .ok_or_else(|| ScenarioError::InvalidParameter {
                    field: "expiry_date",
                    reason: format!("{evaluation_date} + {day} days is out of range"),
                })?;

            samples.push(PricedSample {
                day_offset: day,
                calendar_date,
                price: estimate.price,
                variation: label.to_string(),
            });
        }

        tracing::info!(
            kind = %kind,
            variation = label,
            days,
            "built term structure"
        );
        Ok(samples)
    }
}

use chrono::NaiveDate;
use mc_pricing::analytic::{BlackScholesMerton, OptionPrice};
use mc_pricing::{CancellationToken, MarketInputs, MonteCarloEstimator, OptionKind};
use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::contract::ContractParameters;
use crate::error::ScenarioResult;
use crate::sample::{PricedSample, VariationLabel};
use crate::sink::PricedSampleSink;
use crate::sweep::{SweepGenerator, SweepIteration};
use crate::term_structure::TermStructureBuilder;

/// Entry points for pricing contracts: single days, term structures and swept
/// scenarios.
pub struct ScenarioEngine<C: Clock = SystemClock> {
    estimator: MonteCarloEstimator,
    clock: C,
    cancel: CancellationToken,
}

impl ScenarioEngine<SystemClock> {
    pub fn from_config(config: &EngineConfig) -> ScenarioResult<Self> {
        Ok(Self::new(MonteCarloEstimator::new(&config.estimator)?, SystemClock))
    }
}

impl<C: Clock> ScenarioEngine<C> {
    pub fn new(estimator: MonteCarloEstimator, clock: C) -> Self {
        Self {
            estimator,
            clock,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that aborts every running and future call of this engine once cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn evaluation_date(&self, evaluation_date: Option<NaiveDate>) -> NaiveDate {
        evaluation_date.unwrap_or_else(|| self.clock.today())
    }

    pub fn price_single_day(
        &self,
        kind: OptionKind,
        market: &MarketInputs,
        day: u32,
    ) -> ScenarioResult<Decimal> {
        let price = self.estimator.price(kind, market, day, &self.cancel)?;

        if tracing::enabled!(tracing::Level::DEBUG) {
            let params = market.derivative_parameter(day)?;
            tracing::debug!(
                kind = %kind,
                day,
                monte_carlo = %price,
                black_scholes = BlackScholesMerton::price(kind, &params),
                "single day price"
            );
        }
        Ok(price)
    }

    /// Daily prices of the unperturbed contract, labelled `ORIGINAL`.
    pub fn generate_term_structure(
        &self,
        kind: OptionKind,
        market: &MarketInputs,
        evaluation_date: Option<NaiveDate>,
        expiry_date: NaiveDate,
    ) -> ScenarioResult<Vec<PricedSample>> {
        market.validate()?;
        let evaluation_date = self.evaluation_date(evaluation_date);
        TermStructureBuilder::new(&self.estimator, &self.cancel).build(
            kind,
            market,
            evaluation_date,
            expiry_date,
            &VariationLabel::Original.to_string(),
            0,
        )
    }

    /// Term structures of every sweep iteration, concatenated in iteration order.
    pub fn generate_swept_scenarios(
        &self,
        kind: OptionKind,
        market: &MarketInputs,
        evaluation_date: Option<NaiveDate>,
        expiry_date: NaiveDate,
    ) -> ScenarioResult<Vec<PricedSample>> {
        market.validate()?;
        let evaluation_date = self.evaluation_date(evaluation_date);
        let iterations: Vec<SweepIteration> = SweepGenerator::new(kind, *market).collect();
        for it in &iterations {
            it.state.market_inputs().check_domain()?;
        }
        let builder = TermStructureBuilder::new(&self.estimator, &self.cancel);

        let curves = self.estimator.in_pool(|| {
            iterations
                .par_iter()
                .map(|it| {
                    let label = it.label.to_string();
                    tracing::info!(
                        iteration = it.index,
                        variation = %label,
                        "pricing sweep iteration"
                    );
                    builder.build(
                        kind,
                        &it.state.market_inputs(),
                        evaluation_date,
                        expiry_date,
                        &label,
                        it.index,
                    )
                })
                .collect::<ScenarioResult<Vec<Vec<PricedSample>>>>()
        })?;

        Ok(curves.into_iter().flatten().collect())
    }

    /// Validates the contract, prices its swept scenarios and stores them under the
    /// contract id. Returns the number of stored samples.
    pub fn price_contract(
        &self,
        contract: &ContractParameters,
        sink: &mut dyn PricedSampleSink,
    ) -> ScenarioResult<usize> {
        contract.validate()?;

        let samples = self.generate_swept_scenarios(
            contract.kind,
            &contract.market,
            contract.evaluation_date,
            contract.expiry_date,
        )?;
        sink.insert(&contract.contract_id, &samples)?;

        tracing::info!(
            contract_id = %contract.contract_id,
            kind = %contract.kind,
            samples = samples.len(),
            "stored contract scenarios"
        );
        Ok(samples.len())
    }
}

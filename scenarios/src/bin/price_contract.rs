use std::process::ExitCode;

use chrono::NaiveDate;
use mc_pricing::{MarketInputs, OptionKind};
use mc_scenarios::{
    ContractParameters, EngineConfig, PricedSample, PricedSampleSink, ScenarioEngine, ScenarioError,
    ScenarioResult, SqliteSink,
};
use rust_decimal::Decimal;

const USAGE: &str = "usage: price_contract <contract-id> <call|put> <current> <strike> \
                     <rate%> <vol%> <expiry YYYY-MM-DD> [evaluation YYYY-MM-DD]";

/// Forwards to the database and echoes every sample as one JSON line.
struct JsonLinesSink<S> {
    inner: S,
}

impl<S: PricedSampleSink> PricedSampleSink for JsonLinesSink<S> {
    fn insert(&mut self, contract_id: &str, samples: &[PricedSample]) -> ScenarioResult<()> {
        self.inner.insert(contract_id, samples)?;
        for sample in samples {
            let line = serde_json::to_string(sample)
                .map_err(|e| ScenarioError::Storage(format!("json: {e}")))?;
            println!("{line}");
        }
        Ok(())
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let contract = match parse_contract(&args) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(&contract) {
        Ok(stored) => {
            tracing::info!(contract_id = %contract.contract_id, stored, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("pricing {} failed: {e}", contract.contract_id);
            ExitCode::FAILURE
        }
    }
}

fn run(contract: &ContractParameters) -> ScenarioResult<usize> {
    let cfg = EngineConfig::from_env()?;
    let engine = ScenarioEngine::from_config(&cfg)?;
    let mut sink = JsonLinesSink {
        inner: SqliteSink::open(&cfg.database_path)?,
    };
    engine.price_contract(contract, &mut sink)
}

fn parse_contract(args: &[String]) -> ScenarioResult<ContractParameters> {
    if args.len() != 7 && args.len() != 8 {
        return Err(ScenarioError::Config(format!(
            "expected 7 or 8 arguments, got {}",
            args.len()
        )));
    }

    let kind: OptionKind = args[1].parse()?;
    let market = MarketInputs::new(
        parse_decimal("current_price", &args[2])?,
        parse_decimal("strike_price", &args[3])?,
        parse_decimal("risk_free_rate", &args[4])?,
        parse_decimal("implied_volatility", &args[5])?,
    );
    let expiry_date = parse_date("expiry_date", &args[6])?;
    let contract = ContractParameters::new(args[0].as_str(), kind, market, expiry_date);

    match args.get(7) {
        Some(raw) => Ok(contract.evaluated_on(parse_date("evaluation_date", raw)?)),
        None => Ok(contract),
    }
}

fn parse_decimal(field: &'static str, raw: &str) -> ScenarioResult<Decimal> {
    raw.trim_end_matches('%')
        .parse::<Decimal>()
        .map_err(|e| ScenarioError::InvalidParameter {
            field,
            reason: format!("{raw:?}: {e}"),
        })
}

fn parse_date(field: &'static str, raw: &str) -> ScenarioResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| ScenarioError::InvalidParameter {
        field,
        reason: format!("{raw:?}: {e}"),
    })
}

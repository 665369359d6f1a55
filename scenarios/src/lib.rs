pub mod clock;
pub mod config;
pub mod contract;
pub mod engine;
pub mod error;
pub mod sample;
pub mod sink;
pub mod sweep;
pub mod term_structure;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EngineConfig;
pub use contract::ContractParameters;
pub use engine::ScenarioEngine;
pub use error::{ScenarioError, ScenarioResult};
pub use sample::{PricedSample, VariationLabel};
pub use sink::{MemorySink, PricedSampleSink, SqliteSink};
pub use sweep::{RuleTable, SweepGenerator, SweepState, CALL_RULES, PUT_RULES, SWEEP_ITERATIONS};
pub use term_structure::TermStructureBuilder;

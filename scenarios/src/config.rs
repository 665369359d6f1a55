use std::path::PathBuf;
use std::str::FromStr;

use mc_pricing::simulation::estimator::DEFAULT_BATCH_SIZE;
use mc_pricing::EstimatorConfig;

use crate::error::{ScenarioError, ScenarioResult};

pub const DEFAULT_DATABASE_PATH: &str = "data/option_prices.db";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub estimator: EstimatorConfig,
    pub database_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            estimator: EstimatorConfig::default(),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

impl EngineConfig {
    /// Reads `MC_WORKERS`, `MC_SEED`, `MC_BATCH_SIZE` and `MC_DATABASE_PATH`, after
    /// loading a `.env` file when one exists.
    pub fn from_env() -> ScenarioResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ScenarioResult<Self> {
        let workers = parse_optional::<usize>(&lookup, "MC_WORKERS")?;
        let seed = parse_optional::<u64>(&lookup, "MC_SEED")?;
        let batch_size =
            parse_optional::<u64>(&lookup, "MC_BATCH_SIZE")?.unwrap_or(DEFAULT_BATCH_SIZE);
        let database_path = lookup("MC_DATABASE_PATH")
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());

        Ok(Self {
            estimator: EstimatorConfig {
                workers,
                seed,
                batch_size,
            },
            database_path: PathBuf::from(database_path),
        })
    }
}

fn parse_optional<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> ScenarioResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ScenarioError::Config(format!("{key}: {e}"))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.estimator.workers, None);
        assert_eq!(config.estimator.seed, None);
        assert_eq!(config.estimator.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
    }

    #[test]
    fn reads_every_variable() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("MC_WORKERS", "4"),
            ("MC_SEED", " 42 "),
            ("MC_BATCH_SIZE", "1000"),
            ("MC_DATABASE_PATH", "/tmp/prices.db"),
        ]))
        .unwrap();
        assert_eq!(config.estimator.workers, Some(4));
        assert_eq!(config.estimator.seed, Some(42));
        assert_eq!(config.estimator.batch_size, 1000);
        assert_eq!(config.database_path, PathBuf::from("/tmp/prices.db"));
    }

    #[test]
    fn malformed_numbers_are_config_errors() {
        let err = EngineConfig::from_lookup(lookup(&[("MC_SEED", "forty-two")])).unwrap_err();
        assert!(matches!(err, ScenarioError::Config(ref msg) if msg.starts_with("MC_SEED")));

        assert!(EngineConfig::from_lookup(lookup(&[("MC_WORKERS", "-1")])).is_err());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("MC_WORKERS", ""),
            ("MC_DATABASE_PATH", " "),
        ]))
        .unwrap();
        assert_eq!(config.estimator.workers, None);
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
    }
}

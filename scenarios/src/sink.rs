use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::error::{ScenarioError, ScenarioResult};
use crate::sample::PricedSample;

/// Destination of priced samples. Insert only.
pub trait PricedSampleSink {
    fn insert(&mut self, contract_id: &str, samples: &[PricedSample]) -> ScenarioResult<()>;
}

#[derive(Debug, Default)]
pub struct MemorySink {
    samples: HashMap<String, Vec<PricedSample>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples_for(&self, contract_id: &str) -> &[PricedSample] {
        self.samples
            .get(contract_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.values().all(Vec::is_empty)
    }
}

impl PricedSampleSink for MemorySink {
    fn insert(&mut self, contract_id: &str, samples: &[PricedSample]) -> ScenarioResult<()> {
        self.samples
            .entry(contract_id.to_string())
            .or_default()
            .extend_from_slice(samples);
        Ok(())
    }
}

/// Stores samples in the `option_prices` table. Prices are kept as decimal text.
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    pub fn open(path: &Path) -> ScenarioResult<Self> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| ScenarioError::Storage(format!("create dir: {e}")))?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let sink = Self::init(conn)?;
        tracing::info!("database initialized at {}", path.display());
        Ok(sink)
    }

    pub fn open_in_memory() -> ScenarioResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> ScenarioResult<Self> {
        let schema = include_str!("../migrations/001_init.sql");
        conn.execute_batch(schema)?;
        Ok(Self { conn })
    }

    /// Stored samples of one contract in insertion order.
    pub fn samples_for(&self, contract_id: &str) -> ScenarioResult<Vec<PricedSample>> {
        let mut stmt = self.conn.prepare(
            "SELECT day_offset, day, price, variation FROM option_prices
             WHERE contract_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(rusqlite::params![contract_id], |row| {
            Ok((
                row.get::<_, u32>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut samples = Vec::new();
        for row in rows {
            let (day_offset, day, price, variation) = row?;
            samples.push(PricedSample {
                day_offset,
                calendar_date: day
                    .parse::<NaiveDate>()
                    .map_err(|e| ScenarioError::Storage(format!("day {day:?}: {e}")))?,
                price: price
                    .parse::<Decimal>()
                    .map_err(|e| ScenarioError::Storage(format!("price {price:?}: {e}")))?,
                variation,
            });
        }
        Ok(samples)
    }
}

impl PricedSampleSink for SqliteSink {
    fn insert(&mut self, contract_id: &str, samples: &[PricedSample]) -> ScenarioResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO option_prices (contract_id, day_offset, day, price, variation)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for sample in samples {
                stmt.execute(rusqlite::params![
                    contract_id,
                    sample.day_offset,
                    sample.calendar_date.to_string(),
                    sample.price.to_string(),
                    sample.variation,
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!(contract_id, rows = samples.len(), "stored priced samples");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn samples() -> Vec<PricedSample> {
        vec![
            PricedSample {
                day_offset: 1,
                calendar_date: NaiveDate::from_ymd_opt(2017, 8, 2).unwrap(),
                price: dec!(0.10),
                variation: "ORIGINAL".to_string(),
            },
            PricedSample {
                day_offset: 2,
                calendar_date: NaiveDate::from_ymd_opt(2017, 8, 3).unwrap(),
                price: dec!(1.25),
                variation: "ORIGINAL".to_string(),
            },
        ]
    }

    #[test]
    fn memory_sink_groups_by_contract() {
        let mut sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.insert("IBM112", &samples()).unwrap();
        sink.insert("IBM113", &samples()[..1]).unwrap();

        assert_eq!(sink.samples_for("IBM112"), samples().as_slice());
        assert_eq!(sink.samples_for("IBM113").len(), 1);
        assert!(sink.samples_for("IBM114").is_empty());
    }

    #[test]
    fn sqlite_sink_keeps_decimal_text() {
        let mut sink = SqliteSink::open_in_memory().unwrap();
        sink.insert("IBM112", &samples()).unwrap();
        sink.insert("IBM113", &samples()[1..]).unwrap();

        let stored = sink.samples_for("IBM112").unwrap();
        assert_eq!(stored, samples());
        assert_eq!(stored[0].price.to_string(), "0.10");

        assert_eq!(sink.samples_for("IBM113").unwrap().len(), 1);
        assert!(sink.samples_for("unknown").unwrap().is_empty());
    }

    #[test]
    fn sqlite_sink_accepts_an_empty_batch() {
        let mut sink = SqliteSink::open_in_memory().unwrap();
        sink.insert("IBM112", &[]).unwrap();
        assert!(sink.samples_for("IBM112").unwrap().is_empty());
    }
}

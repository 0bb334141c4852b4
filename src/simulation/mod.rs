//! Mock traffic driver
//!
//! Generates visits for one site, tracks them through a [`RollupDatabase`] and optionally
//! writes the visits and the resulting tables to disk.

pub mod config;
pub mod generator;
pub mod report;
pub mod throttle;

pub use config::{ConfigError, SimulationConfig};
pub use generator::{Event, EventGenerator};
pub use report::{ReportError, ReportFiles, ReportWriter};
pub use throttle::Throttle;

use crate::rollup::{RollupDatabase, RollupError};
use crate::storage::KeyspaceStats;
use serde::Serialize;
use std::time::Instant;

/// Features every simulated visit carries
pub const FEATURES: [&str; 2] = ["landing_page", "referer"];

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rollup error: {0}")]
    Rollup(#[from] RollupError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub site: String,
    pub events: usize,
    pub combos: usize,
    pub unique_combos: usize,
    pub elapsed_ms: u128,
    pub keyspace: KeyspaceStats,
    pub report: Option<ReportFiles>,
}

pub struct Simulation {
    config: SimulationConfig,
    db: RollupDatabase,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self {
            config,
            db: RollupDatabase::new(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn database(&self) -> &RollupDatabase {
        &self.db
    }

    pub fn run(&self) -> Result<SimulationSummary, SimulationError> {
        let config = &self.config;
        let started = Instant::now();

        self.db.register_site(&config.site, FEATURES)?;

        let throttle = Throttle::new(config.rate)?;
        let generator =
            EventGenerator::new(config.visitors, config.start, config.end, config.seed);
        let mut report = match &config.output_dir {
            Some(dir) => Some(ReportWriter::create(dir, &config.site)?),
            None => None,
        };

        tracing::info!(
            "Simulating {} events for site '{}' from {} visitors",
            config.events,
            config.site,
            config.visitors
        );

        let mut combos = 0;
        let mut unique_combos = 0;
        for (i, event) in generator.take(config.events).enumerate() {
            throttle.acquire();

            let outcome =
                self.db
                    .track(&config.site, event.timestamp, &event.visitor_id, &event.features())?;
            combos += outcome.combos;
            unique_combos += outcome.unique;

            if let Some(report) = report.as_mut() {
                report.write_csv(&event.to_csv())?;
            }
            if (i + 1) % 1000 == 0 {
                tracing::debug!("Tracked {} events", i + 1);
            }
        }

        let report = match report {
            Some(mut writer) => {
                for table in [
                    self.db.raw_table(&config.site),
                    self.db.monthly_table(&config.site),
                ]
                .into_iter()
                .flatten()
                {
                    writer.write_table(&table)?;
                }
                let files = writer.finish()?;
                tracing::info!("Report written to {}", files.tables.display());
                Some(files)
            }
            None => None,
        };

        Ok(SimulationSummary {
            site: config.site.clone(),
            events: config.events,
            combos,
            unique_combos,
            elapsed_ms: started.elapsed().as_millis(),
            keyspace: self.db.stats(),
            report,
        })
    }
}

//! Simulation configuration
//!
//! Read from the environment by the binary:
//! - CARDINALITY_SITE: Site id (default: site1)
//! - CARDINALITY_EVENTS: Number of events to track (default: 50)
//! - CARDINALITY_VISITORS: Size of the visitor pool (default: 20)
//! - CARDINALITY_START / CARDINALITY_END: Event timestamp range, epoch seconds
//!   (default: 2018-07-01 .. 2018-10-01)
//! - CARDINALITY_RATE: Events per second, 0 for unthrottled (default: 0)
//! - CARDINALITY_SEED: Seed for a reproducible event stream (default: random)
//! - CARDINALITY_OUTPUT_DIR: Directory for the CSV and table reports (default: none)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub site: String,
    pub events: usize,
    pub visitors: usize,
    pub start: i64,
    pub end: i64,
    pub rate: f64,
    pub seed: Option<u64>,
    pub output_dir: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            site: "site1".to_string(),
            events: 50,
            visitors: 20,
            start: 1530403200, // 2018-07-01
            end: 1538352000,   // 2018-10-01
            rate: 0.0,
            seed: None,
            output_dir: None,
        }
    }
}

impl SimulationConfig {
    pub fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            ..Default::default()
        }
    }

    pub fn with_events(mut self, events: usize) -> Self {
        self.events = events;
        self
    }

    pub fn with_visitors(mut self, visitors: usize) -> Self {
        self.visitors = visitors;
        self
    }

    pub fn with_time_range(mut self, start: i64, end: i64) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Build a configuration from `CARDINALITY_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            site: lookup("CARDINALITY_SITE").unwrap_or(defaults.site),
            events: parse_var(&lookup, "CARDINALITY_EVENTS")?.unwrap_or(defaults.events),
            visitors: parse_var(&lookup, "CARDINALITY_VISITORS")?.unwrap_or(defaults.visitors),
            start: parse_var(&lookup, "CARDINALITY_START")?.unwrap_or(defaults.start),
            end: parse_var(&lookup, "CARDINALITY_END")?.unwrap_or(defaults.end),
            rate: parse_var(&lookup, "CARDINALITY_RATE")?.unwrap_or(defaults.rate),
            seed: parse_var(&lookup, "CARDINALITY_SEED")?,
            output_dir: lookup("CARDINALITY_OUTPUT_DIR")
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.visitors == 0 {
            return Err(ConfigError::NoVisitors);
        }
        if self.end < self.start {
            return Err(ConfigError::EmptyTimeRange {
                start: self.start,
                end: self.end,
            });
        }
        if !self.rate.is_finite() || self.rate < 0.0 {
            return Err(ConfigError::InvalidRate(self.rate));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                var: var.to_string(),
                value,
            }),
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {var}")]
    Invalid { var: String, value: String },

    #[error("Visitor pool must not be empty")]
    NoVisitors,

    #[error("Time range end {end} is before start {start}")]
    EmptyTimeRange { start: i64, end: i64 },

    #[error("Invalid event rate {0}")]
    InvalidRate(f64),
}

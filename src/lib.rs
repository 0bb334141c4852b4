//! Cardinality: Visitor Cardinality Rollups over an In-Memory Wide-Column Store
//!
//! Counts unique and total visitors per site at monthly, weekly and daily granularity,
//! sliced by combinations of visit features.
//!
//! # Features
//!
//! - **Column Families**: Partitioned, sorted records addressed by composite keys
//! - **Counter Columns**: `field+N` / `field-N` increments applied atomically per record
//! - **Range Reads**: Exclusive column ranges within one partition
//! - **Feature Fan-out**: Quadratic set of feature projections per tracked event
//! - **Interval Bucketing**: Month, ISO week and day starts in UTC
//!
//! # Example
//!
//! ```no_run
//! use cardinality::rollup::RollupDatabase;
//! use std::collections::HashMap;
//!
//! let db = RollupDatabase::new();
//! db.register_site("site1", ["referer", "landing_page"]).unwrap();
//!
//! let mut features = HashMap::new();
//! features.insert("referer".to_string(), "google.com".to_string());
//! features.insert("landing_page".to_string(), "/pricing".to_string());
//! db.track("site1", 1541562050, "visitor-1", &features).unwrap();
//!
//! let uniques = db.monthly_uniques("site1", 1541030400, &HashMap::new()).unwrap();
//! println!("Unique visitors: {}", uniques);
//! ```

pub mod data;
pub mod rollup;
pub mod simulation;
pub mod storage;
pub mod time;

// Re-export commonly used types
pub use data::{Mutation, Row, Value};
pub use rollup::{RollupDatabase, RollupError};
pub use storage::{ColumnFamily, Keyspace, Lookup, Schema, StorageError};

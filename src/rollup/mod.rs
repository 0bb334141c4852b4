//! Visitor cardinality rollups on top of the column family store
//!
//! Every registered site gets a raw per-visitor table and a monthly aggregate table.
//! Tracked events are fanned out over feature projections (see [`patterns`]) so counts
//! can later be read per single feature, per feature pair or for the full feature set.

pub mod database;
pub mod patterns;
pub mod registry;

pub use database::{RollupDatabase, TrackOutcome};
pub use patterns::{feature_combos, feature_patterns, pattern_count, FeatureCombo, FeaturePattern};
pub use registry::{FeatureRegistry, RESERVED_FIELDS};

use crate::storage::StorageError;
use crate::time::TimeError;

#[derive(Debug, thiserror::Error)]
pub enum RollupError {
    #[error("Site '{0}' is not registered")]
    UnknownSite(String),

    #[error("Invalid site id '{0}'")]
    InvalidSiteId(String),

    #[error("Feature name '{0}' is reserved")]
    ReservedFeatureName(String),

    #[error("Invalid feature name '{0}'")]
    InvalidFeatureName(String),

    #[error("Feature '{feature}' is not registered for site '{site}'")]
    UnknownFeature { site: String, feature: String },

    #[error("Timestamp error: {0}")]
    Timestamp(#[from] TimeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub mod column_family;
pub mod key;
pub mod keyspace;
pub mod record;
pub mod schema;

pub use column_family::{ColumnFamily, ColumnFamilyStats};
pub use key::{build_key, build_prefix, SEPARATOR};
pub use keyspace::{Keyspace, KeyspaceStats};
pub use record::RecordStore;
pub use schema::{create_schema, Schema};

use crate::data::Value;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Required key '{0}' missing")]
    MissingKeyField(String),

    #[error("Non integer counter type for counter '{column}': {existing}")]
    NonIntegerCounter { column: String, existing: Value },

    #[error("Value '{value}' for key field '{field}' contains the key separator")]
    SeparatorInKey { field: String, value: String },

    #[error("Invalid field name '{0}'")]
    InvalidFieldName(String),

    #[error("Field '{0}' appears more than once in the schema")]
    DuplicateField(String),

    #[error("Counter '{0}' overflowed")]
    CounterOverflow(String),

    #[error("Column family '{0}' already exists with a different schema")]
    SchemaMismatch(String),
}

/// Result of a read. Misses are normal control flow, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    /// The partition exists but has no such column
    ColumnNotFound,
    /// No record store exists for the partition key
    PartitionNotFound,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn is_partition_not_found(&self) -> bool {
        matches!(self, Lookup::PartitionNotFound)
    }
}

use super::column_family::{ColumnFamily, ColumnFamilyStats};
use super::schema::Schema;
use super::StorageError;
use dashmap::DashMap;
use std::sync::Arc;

/// Named column families
#[derive(Debug, Default)]
pub struct Keyspace {
    families: DashMap<String, Arc<ColumnFamily>>,
}

impl Keyspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the column family `name`, creating it with `schema` if it does not exist.
    ///
    /// Schemas are immutable once created: opening an existing family with a different
    /// schema fails.
    pub fn open_or_create(
        &self,
        name: &str,
        schema: Schema,
    ) -> Result<Arc<ColumnFamily>, StorageError> {
        if let Some(family) = self.families.get(name) {
            return check_schema(&family, &schema);
        }

        let family = self
            .families
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!(
                    "Creating column family '{}' (partition: {:?}, clustering: {:?})",
                    name,
                    schema.partition_fields(),
                    schema.clustering_fields()
                );
                Arc::new(ColumnFamily::new(name, schema.clone()))
            });
        check_schema(&family, &schema)
    }

    /// Get an existing column family
    pub fn get(&self, name: &str) -> Option<Arc<ColumnFamily>> {
        self.families.get(name).map(|f| Arc::clone(f.value()))
    }

    /// Drop a column family, returning whether it existed
    pub fn drop_family(&self, name: &str) -> bool {
        self.families.remove(name).is_some()
    }

    /// Column family names in ascending order
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.families.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn stats(&self) -> KeyspaceStats {
        let mut families: Vec<ColumnFamilyStats> =
            self.families.iter().map(|e| e.value().stats()).collect();
        families.sort_by(|a, b| a.name.cmp(&b.name));
        KeyspaceStats { families }
    }
}

fn check_schema(family: &Arc<ColumnFamily>, schema: &Schema) -> Result<Arc<ColumnFamily>, StorageError> {
    if family.schema() != schema {
        return Err(StorageError::SchemaMismatch(family.name().to_string()));
    }
    Ok(Arc::clone(family))
}

/// Statistics for every column family in a keyspace
#[derive(Debug, Clone, serde::Serialize)]
pub struct KeyspaceStats {
    pub families: Vec<ColumnFamilyStats>,
}

use super::key::{build_key, build_prefix, SEPARATOR};
use super::record::{to_mutation, RecordStore};
use super::schema::Schema;
use super::{Lookup, StorageError};
use crate::data::{Mutation, Row, Value};
use dashmap::DashMap;
use fxhash::FxBuildHasher;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Named collection of partitions sharing one schema.
///
/// Each partition key maps to its own [`RecordStore`]; partitions are created on first
/// write and are independent of each other.
#[derive(Debug)]
pub struct ColumnFamily {
    name: String,
    schema: Schema,
    partitions: DashMap<String, Arc<RecordStore>, FxBuildHasher>,
}

impl ColumnFamily {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            partitions: DashMap::with_hasher(FxBuildHasher::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Upsert the columns in `data` into the partition selected by `keys`.
    ///
    /// Clustering field values are read from `data` and prefix every other column name;
    /// they are not stored as columns themselves. Returns the partition's contents before
    /// the write, or `None` if this call created the partition.
    pub fn update(
        &self,
        keys: &Row,
        data: &Row,
    ) -> Result<Option<BTreeMap<String, Value>>, StorageError> {
        let partition_key = build_key(keys, self.schema.partition_fields())?;
        let mutations = self.column_mutations(data)?;

        let (store, created) = self.partition_or_insert(partition_key);
        if created {
            store.apply_all(mutations)?;
            Ok(None)
        } else {
            store.apply_all_returning_previous(mutations).map(Some)
        }
    }

    /// Upsert only if the partition already exists. Returns whether it did.
    pub fn update_if_exists(&self, keys: &Row, data: &Row) -> Result<bool, StorageError> {
        let partition_key = build_key(keys, self.schema.partition_fields())?;
        let mutations = self.column_mutations(data)?;

        match self.partition(&partition_key) {
            Some(store) => {
                store.apply_all(mutations)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Read one column.
    ///
    /// Clustering values come from `columns`; the remaining names in `columns` (in
    /// ascending order) form the column name. Their values are ignored.
    pub fn select_one(&self, keys: &Row, columns: &Row) -> Result<Lookup<Value>, StorageError> {
        let partition_key = build_key(keys, self.schema.partition_fields())?;
        let column_key = self.column_key(columns)?;

        Ok(match self.partition(&partition_key) {
            None => Lookup::PartitionNotFound,
            Some(store) => match store.get(&column_key) {
                Some(value) => Lookup::Found(value),
                None => Lookup::ColumnNotFound,
            },
        })
    }

    /// Columns strictly between the keys described by `from_columns` and `to_columns`,
    /// in ascending key order.
    pub fn select_range(
        &self,
        keys: &Row,
        from_columns: &Row,
        to_columns: &Row,
    ) -> Result<Lookup<Vec<(String, Value)>>, StorageError> {
        let partition_key = build_key(keys, self.schema.partition_fields())?;
        let from = self.column_key(from_columns)?;
        let to = self.column_key(to_columns)?;

        Ok(match self.partition(&partition_key) {
            None => Lookup::PartitionNotFound,
            Some(store) => Lookup::Found(store.range(&from, false, &to, false)),
        })
    }

    /// Record store for the partition selected by `keys`, if it exists
    pub fn partition_for(&self, keys: &Row) -> Result<Option<Arc<RecordStore>>, StorageError> {
        let partition_key = build_key(keys, self.schema.partition_fields())?;
        Ok(self.partition(&partition_key))
    }

    pub fn partition(&self, partition_key: &str) -> Option<Arc<RecordStore>> {
        self.partitions.get(partition_key).map(|p| Arc::clone(p.value()))
    }

    pub fn contains_partition(&self, partition_key: &str) -> bool {
        self.partitions.contains_key(partition_key)
    }

    /// Partition keys in ascending order
    pub fn partition_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.partitions.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn stats(&self) -> ColumnFamilyStats {
        ColumnFamilyStats {
            name: self.name.clone(),
            partitions: self.partitions.len(),
            columns: self.partitions.iter().map(|e| e.value().len()).sum(),
        }
    }

    fn partition_or_insert(&self, partition_key: String) -> (Arc<RecordStore>, bool) {
        if let Some(store) = self.partition(&partition_key) {
            return (store, false);
        }

        let mut created = false;
        let entry = self.partitions.entry(partition_key).or_insert_with(|| {
            created = true;
            Arc::new(RecordStore::new())
        });
        (Arc::clone(entry.value()), created)
    }

    fn column_mutations(&self, data: &Row) -> Result<Vec<(String, Mutation)>, StorageError> {
        let prefix = build_prefix(data, self.schema.clustering_fields())?;

        let mut mutations = Vec::with_capacity(data.len());
        for (name, value) in data {
            if self.schema.is_clustering_field(name) {
                continue;
            }
            if name.contains(SEPARATOR) {
                return Err(StorageError::InvalidFieldName(name.clone()));
            }
            let column = format!("{}{}", prefix, name);
            let mutation = to_mutation(&column, value.clone())?;
            mutations.push((column, mutation));
        }
        Ok(mutations)
    }

    fn column_key(&self, columns: &Row) -> Result<String, StorageError> {
        let prefix = build_prefix(columns, self.schema.clustering_fields())?;

        let mut names: Vec<&str> = columns
            .keys()
            .filter(|name| !self.schema.is_clustering_field(name))
            .map(String::as_str)
            .collect();
        names.sort_unstable();

        Ok(format!("{}{}", prefix, names.join(SEPARATOR.to_string().as_str())))
    }
}

impl std::fmt::Display for ColumnFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Column Family: '{}'", self.name)?;
        for key in self.partition_keys() {
            if let Some(store) = self.partition(&key) {
                writeln!(f, "Partition Key: '{}'", key)?;
                write!(f, "{}", store)?;
            }
        }
        Ok(())
    }
}

/// Statistics about a column family
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ColumnFamilyStats {
    pub name: String,
    pub partitions: usize,
    pub columns: usize,
}

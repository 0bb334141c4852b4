use super::key::SEPARATOR;
use super::StorageError;
use std::collections::HashSet;

/// Key layout of a column family.
///
/// Partition fields select the record store; clustering fields prefix the column
/// names inside it. Order matters for both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    partition_fields: Vec<String>,
    clustering_fields: Vec<String>,
}

impl Schema {
    pub fn new<P, C>(partition_fields: P, clustering_fields: C) -> Result<Self, StorageError>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let partition_fields: Vec<String> = partition_fields.into_iter().map(Into::into).collect();
        let clustering_fields: Vec<String> =
            clustering_fields.into_iter().map(Into::into).collect();

        let mut seen = HashSet::new();
        for field in partition_fields.iter().chain(clustering_fields.iter()) {
            if field.is_empty() || field.contains(SEPARATOR) {
                return Err(StorageError::InvalidFieldName(field.clone()));
            }
            if !seen.insert(field.as_str()) {
                return Err(StorageError::DuplicateField(field.clone()));
            }
        }

        Ok(Self {
            partition_fields,
            clustering_fields,
        })
    }

    pub fn partition_fields(&self) -> &[String] {
        &self.partition_fields
    }

    pub fn clustering_fields(&self) -> &[String] {
        &self.clustering_fields
    }

    pub fn is_clustering_field(&self, name: &str) -> bool {
        self.clustering_fields.iter().any(|f| f == name)
    }
}

/// Convenience constructor mirroring [`Schema::new`]
pub fn create_schema<P, C>(partition_fields: P, clustering_fields: C) -> Result<Schema, StorageError>
where
    P: IntoIterator,
    P::Item: Into<String>,
    C: IntoIterator,
    C::Item: Into<String>,
{
    Schema::new(partition_fields, clustering_fields)
}

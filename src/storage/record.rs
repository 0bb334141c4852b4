//! Ordered column storage for a single partition

use super::key::field_name;
use super::StorageError;
use crate::data::{parse_counter_expr, CounterExpr, Mutation, Value};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;

/// Columns of one partition, ordered lexicographically by column key.
///
/// Writers take the lock for the whole read-modify-write, so updates to one partition
/// are linearizable and readers never see half of a multi-column write.
#[derive(Debug, Default)]
pub struct RecordStore {
    columns: RwLock<BTreeMap<String, Value>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `column`, returning the previous value.
    ///
    /// Text of the form `<field>+N` / `<field>-N`, where `<field>` is the column's
    /// trailing field name, is applied as a counter update.
    pub fn put(&self, column: &str, value: impl Into<Value>) -> Result<Option<Value>, StorageError> {
        let mutation = to_mutation(column, value.into())?;
        self.apply(column, mutation)
    }

    /// Apply a typed mutation, returning the previous value
    pub fn apply(&self, column: &str, mutation: Mutation) -> Result<Option<Value>, StorageError> {
        let mut columns = self.columns.write();
        let previous = columns.get(column).cloned();
        let next = resolve(column, previous.as_ref(), mutation)?;
        columns.insert(column.to_string(), next);
        Ok(previous)
    }

    /// Apply several mutations as one write.
    ///
    /// Every mutation is resolved before anything is stored; on error the partition is
    /// left untouched. Mutations to the same column compose in order.
    pub fn apply_all<I>(&self, mutations: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = (String, Mutation)>,
    {
        let mut columns = self.columns.write();
        let staged = stage(&columns, mutations)?;
        columns.extend(staged);
        Ok(())
    }

    /// Like [`apply_all`](Self::apply_all), returning the contents as they were just
    /// before this write under the same lock.
    pub fn apply_all_returning_previous<I>(
        &self,
        mutations: I,
    ) -> Result<BTreeMap<String, Value>, StorageError>
    where
        I: IntoIterator<Item = (String, Mutation)>,
    {
        let mut columns = self.columns.write();
        let staged = stage(&columns, mutations)?;
        let previous = columns.clone();
        columns.extend(staged);
        Ok(previous)
    }

    pub fn get(&self, column: &str) -> Option<Value> {
        self.columns.read().get(column).cloned()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.read().contains_key(column)
    }

    /// Columns between `from` and `to` in ascending key order, each bound
    /// independently inclusive or exclusive.
    pub fn range(
        &self,
        from: &str,
        from_inclusive: bool,
        to: &str,
        to_inclusive: bool,
    ) -> Vec<(String, Value)> {
        // BTreeMap::range panics on inverted or empty-exclusive bounds
        if from > to || (from == to && !(from_inclusive && to_inclusive)) {
            return Vec::new();
        }

        let lower = if from_inclusive {
            Bound::Included(from)
        } else {
            Bound::Excluded(from)
        };
        let upper = if to_inclusive {
            Bound::Included(to)
        } else {
            Bound::Excluded(to)
        };

        self.columns
            .read()
            .range::<str, _>((lower, upper))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.columns.read().clone()
    }

    pub fn len(&self) -> usize {
        self.columns.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.read().is_empty()
    }
}

/// Convert a raw value into a mutation for `column`, recognizing the legacy counter form.
pub(crate) fn to_mutation(column: &str, value: Value) -> Result<Mutation, StorageError> {
    let counter = match &value {
        Value::Text(text) => match parse_counter_expr(field_name(column), text) {
            CounterExpr::Match { op, amount } => Some(Mutation::Increment { op, amount }),
            CounterExpr::Overflow => return Err(StorageError::CounterOverflow(column.to_string())),
            CounterExpr::NoMatch => None,
        },
        Value::Int(_) => None,
    };
    Ok(counter.unwrap_or(Mutation::Literal(value)))
}

/// Resolve every mutation against `columns` without storing anything
fn stage<I>(columns: &BTreeMap<String, Value>, mutations: I) -> Result<BTreeMap<String, Value>, StorageError>
where
    I: IntoIterator<Item = (String, Mutation)>,
{
    let mut staged: BTreeMap<String, Value> = BTreeMap::new();
    for (column, mutation) in mutations {
        let current = staged.get(&column).or_else(|| columns.get(&column));
        let next = resolve(&column, current, mutation)?;
        staged.insert(column, next);
    }
    Ok(staged)
}

fn resolve(column: &str, current: Option<&Value>, mutation: Mutation) -> Result<Value, StorageError> {
    match mutation {
        Mutation::Literal(value) => Ok(value),
        Mutation::Increment { op, amount } => {
            let base = match current {
                None => 0,
                Some(Value::Int(v)) => *v,
                Some(other) => {
                    return Err(StorageError::NonIntegerCounter {
                        column: column.to_string(),
                        existing: other.clone(),
                    })
                }
            };
            op.apply(base, amount)
                .map(Value::Int)
                .ok_or_else(|| StorageError::CounterOverflow(column.to_string()))
        }
    }
}

impl std::fmt::Display for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (column, value) in self.columns.read().iter() {
            writeln!(f, "=>(column='{}', value='{}')", column, value)?;
        }
        Ok(())
    }
}

//! Composite key codec
//!
//! Keys are the string values of an ordered list of fields joined with [`SEPARATOR`].
//! Values are not escaped, so a value containing the separator is rejected instead of
//! silently producing a key that parses back differently.

use super::StorageError;
use crate::data::{Row, Value};

pub const SEPARATOR: char = ':';

/// Build the composite key for `fields` from `values`, in field order.
///
/// An empty field list yields the empty string.
pub fn build_key(values: &Row, fields: &[String]) -> Result<String, StorageError> {
    let mut key = String::new();
    for (i, field) in fields.iter().enumerate() {
        let value = values
            .get(field)
            .ok_or_else(|| StorageError::MissingKeyField(field.clone()))?;
        check_value(field, value)?;
        if i > 0 {
            key.push(SEPARATOR);
        }
        key.push_str(&value.to_string());
    }
    Ok(key)
}

/// Like [`build_key`] but with a trailing separator when the key is non-empty,
/// ready to be prepended to a column name.
pub fn build_prefix(values: &Row, fields: &[String]) -> Result<String, StorageError> {
    let mut prefix = build_key(values, fields)?;
    if !prefix.is_empty() {
        prefix.push(SEPARATOR);
    }
    Ok(prefix)
}

fn check_value(field: &str, value: &Value) -> Result<(), StorageError> {
    if value.contains(SEPARATOR) {
        return Err(StorageError::SeparatorInKey {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// The trailing field name of a column key: the text after the last separator,
/// or the whole key when it has none.
pub fn field_name(column_key: &str) -> &str {
    match column_key.rfind(SEPARATOR) {
        Some(pos) => &column_key[pos + SEPARATOR.len_utf8()..],
        None => column_key,
    }
}

/// Split a composite key back into its segments
pub fn split_key(key: &str) -> impl Iterator<Item = &str> {
    key.split(SEPARATOR)
}

//! Map editor: a string-to-string mapping edited as (key, value) rows.
//!
//! Every operation returns a new map; the input is never mutated.

use serde_json::{Map, Value};

use crate::domain::FieldPath;

use super::{
    actions::EditAction,
    error::{FormError, FormResult},
    value_ops::object_or_empty,
};

/// Append an empty row (`"" -> ""`).
pub fn add_entry(map: &Map<String, Value>) -> Map<String, Value> {
    let mut next = map.clone();
    next.insert(String::new(), Value::String(String::new()));
    next
}

pub fn remove_entry(map: &Map<String, Value>, key: &str) -> Map<String, Value> {
    let mut next = map.clone();
    next.shift_remove(key);
    next
}

/// Rename `from` to `to` as a delete followed by an insert.
///
/// Renaming onto an existing key overwrites that entry. Renaming a key that
/// does not exist, or to itself, returns the map unchanged.
pub fn rename_key(map: &Map<String, Value>, from: &str, to: &str) -> Map<String, Value> {
    let mut next = map.clone();
    if from == to {
        return next;
    }
    if let Some(value) = next.shift_remove(from) {
        next.insert(to.to_string(), value);
    }
    next
}

pub fn set_entry_value(map: &Map<String, Value>, key: &str, value: &str) -> Map<String, Value> {
    let mut next = map.clone();
    next.insert(key.to_string(), Value::String(value.to_string()));
    next
}

pub(crate) fn apply(
    current: Option<&Value>,
    action: &EditAction,
    path: &FieldPath,
) -> FormResult<Option<Value>> {
    let map = object_or_empty(current);
    let next = match action {
        EditAction::MapAdd => add_entry(&map),
        EditAction::MapRemove { key } => remove_entry(&map, key),
        EditAction::MapRename { from, to } => rename_key(&map, from, to),
        EditAction::MapSetValue { key, value } => set_entry_value(&map, key, value),
        other => {
            return Err(FormError::UnsupportedEdit {
                path: path.clone(),
                action: other.name(),
                kind: "map".to_string(),
            });
        }
    };
    Ok(Some(Value::Object(next)))
}

//! Array editor: ordered items that are scalars or nested objects.

use serde_json::{Map, Number, Value};

use crate::domain::{ArrayItemKind, FieldPath};

use super::{
    actions::EditAction,
    error::{FormError, FormResult},
    value_ops::items_or_empty,
};

/// Value appended by "add item".
pub fn default_item(kind: &ArrayItemKind) -> Value {
    match kind {
        ArrayItemKind::Number => Value::Number(Number::from(0)),
        ArrayItemKind::Object(_) => Value::Object(Map::new()),
        ArrayItemKind::String | ArrayItemKind::Other(_) => Value::String(String::new()),
    }
}

pub fn push_default(items: &[Value], kind: &ArrayItemKind) -> Vec<Value> {
    let mut next = items.to_vec();
    next.push(default_item(kind));
    next
}

/// Remove the item at `index`, shifting later items down.
pub fn remove_item(items: &[Value], index: usize, path: &FieldPath) -> FormResult<Vec<Value>> {
    check_bounds(items, index, path)?;
    let mut next = items.to_vec();
    next.remove(index);
    Ok(next)
}

pub fn replace_item(
    items: &[Value],
    index: usize,
    value: Value,
    path: &FieldPath,
) -> FormResult<Vec<Value>> {
    check_bounds(items, index, path)?;
    let mut next = items.to_vec();
    next[index] = value;
    Ok(next)
}

fn check_bounds(items: &[Value], index: usize, path: &FieldPath) -> FormResult<()> {
    if index < items.len() {
        Ok(())
    } else {
        Err(FormError::IndexOutOfBounds {
            path: path.clone(),
            index,
            len: items.len(),
        })
    }
}

pub(crate) fn apply(
    kind: &ArrayItemKind,
    current: Option<&Value>,
    action: &EditAction,
    path: &FieldPath,
) -> FormResult<Option<Value>> {
    let items = items_or_empty(current);
    let next = match action {
        EditAction::ArrayAdd => push_default(items, kind),
        EditAction::ArrayRemove { index } => remove_item(items, *index, path)?,
        EditAction::ArrayReplace { index, value } => {
            replace_item(items, *index, value.clone(), path)?
        }
        other => {
            return Err(FormError::UnsupportedEdit {
                path: path.clone(),
                action: other.name(),
                kind: "array".to_string(),
            });
        }
    };
    Ok(Some(Value::Array(next)))
}

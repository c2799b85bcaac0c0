use serde_json::{Map, Number, Value};

use crate::domain::{FieldPath, PathSegment};

use super::error::{FormError, FormResult};

/// Borrow the slice of `root` addressed by `path`.
pub fn value_at<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(root, |current, segment| match segment {
            PathSegment::Key(key) => current.as_object()?.get(key),
            PathSegment::Index(index) => current.as_array()?.get(*index),
        })
}

/// Return a new tree equal to `root` except at `path`.
///
/// `None` removes the key (or nulls an array slot). Missing or non-object
/// parents on a key step become `{}`. An index may address an existing item or
/// the slot one past the end.
pub fn set_at(root: &Value, path: &FieldPath, value: Option<Value>) -> FormResult<Value> {
    let patched = patch(Some(root), path, 0, value)?;
    Ok(patched.unwrap_or(Value::Null))
}

fn patch(
    current: Option<&Value>,
    path: &FieldPath,
    depth: usize,
    value: Option<Value>,
) -> FormResult<Option<Value>> {
    let Some(segment) = path.segments().get(depth) else {
        return Ok(value);
    };
    match segment {
        PathSegment::Key(key) => {
            let mut map = current
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            match patch(map.get(key), path, depth + 1, value)? {
                Some(next) => {
                    map.insert(key.clone(), next);
                }
                None => {
                    map.shift_remove(key);
                }
            }
            Ok(Some(Value::Object(map)))
        }
        PathSegment::Index(index) => {
            let mut items = current
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let len = items.len();
            if *index > len {
                return Err(FormError::IndexOutOfBounds {
                    path: prefix(path, depth),
                    index: *index,
                    len,
                });
            }
            let next = patch(items.get(*index), path, depth + 1, value)?.unwrap_or(Value::Null);
            if *index == len {
                items.push(next);
            } else {
                items[*index] = next;
            }
            Ok(Some(Value::Array(items)))
        }
    }
}

fn prefix(path: &FieldPath, depth: usize) -> FieldPath {
    path.segments()[..depth]
        .iter()
        .fold(FieldPath::root(), |acc, segment| match segment {
            PathSegment::Key(key) => acc.child(key),
            PathSegment::Index(index) => acc.index(*index),
        })
}

pub(crate) fn text_or_empty(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn bool_or_false(value: Option<&Value>) -> bool {
    value.and_then(Value::as_bool).unwrap_or(false)
}

pub(crate) fn number_or_none(value: Option<&Value>) -> Option<Number> {
    match value {
        Some(Value::Number(number)) => Some(number.clone()),
        Some(Value::String(text)) => parse_number(text).ok().flatten(),
        _ => None,
    }
}

pub(crate) fn items_or_empty(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

pub(crate) fn object_or_empty(value: Option<&Value>) -> Map<String, Value> {
    value
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Parse number-editor text: blank clears the field, integers stay integral.
pub(crate) fn parse_number(text: &str) -> Result<Option<Number>, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Ok(Some(Number::from(integer)));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Some)
        .ok_or_else(|| format!("'{trimmed}' is not a valid number"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn path(text: &str) -> FieldPath {
        text.parse().expect("valid path")
    }

    #[test]
    fn reads_nested_slices() {
        let root = json!({"a": {"b": [1, {"c": "x"}]}});
        assert_eq!(value_at(&root, &path("a.b[1].c")), Some(&json!("x")));
        assert_eq!(value_at(&root, &path("a.b[5]")), None);
        assert_eq!(value_at(&root, &path("a.b.c")), None);
        assert_eq!(value_at(&root, &FieldPath::root()), Some(&root));
    }

    #[test]
    fn set_leaves_siblings_and_input_untouched() {
        let root = json!({"a": {"b": 1, "c": {"deep": true}}, "z": [1, 2]});
        let next = set_at(&root, &path("a.b"), Some(json!(2))).expect("set");
        assert_eq!(next, json!({"a": {"b": 2, "c": {"deep": true}}, "z": [1, 2]}));
        assert_eq!(root["a"]["b"], json!(1));
        assert_eq!(next["a"]["c"], root["a"]["c"]);
        assert_eq!(next["z"], root["z"]);
    }

    #[test]
    fn set_creates_missing_parents() {
        let next = set_at(&Value::Null, &path("a.b.c"), Some(json!("v"))).expect("set");
        assert_eq!(next, json!({"a": {"b": {"c": "v"}}}));
        let next = set_at(&json!({"a": "scalar"}), &path("a.b"), Some(json!(1))).expect("set");
        assert_eq!(next, json!({"a": {"b": 1}}));
    }

    #[test]
    fn none_removes_keys_and_keeps_order() {
        let root = json!({"x": 1, "y": 2, "z": 3});
        let next = set_at(&root, &path("y"), None).expect("remove");
        assert_eq!(next.as_object().expect("map").keys().collect::<Vec<_>>(), ["x", "z"]);
    }

    #[test]
    fn index_steps_replace_or_append() {
        let root = json!({"list": ["a", "b"]});
        let replaced = set_at(&root, &path("list[1]"), Some(json!("B"))).expect("replace");
        assert_eq!(replaced, json!({"list": ["a", "B"]}));
        let appended = set_at(&root, &path("list[2]"), Some(json!("c"))).expect("append");
        assert_eq!(appended, json!({"list": ["a", "b", "c"]}));
        let err = set_at(&root, &path("list[4]"), Some(json!("c"))).expect_err("gap");
        assert!(matches!(
            err,
            FormError::IndexOutOfBounds { index: 4, len: 2, .. }
        ));
    }

    #[test]
    fn number_text_parsing() {
        assert_eq!(parse_number(""), Ok(None));
        assert_eq!(parse_number("  "), Ok(None));
        assert_eq!(parse_number("42"), Ok(Some(Number::from(42))));
        assert_eq!(parse_number("1.5"), Ok(Number::from_f64(1.5).map(Some).expect("f64")));
        assert!(parse_number("abc").is_err());
    }

    #[test]
    fn coercions_fall_back_to_empty_values() {
        assert_eq!(text_or_empty(None), "");
        assert_eq!(text_or_empty(Some(&json!({"x": 1}))), "");
        assert_eq!(text_or_empty(Some(&json!(3))), "3");
        assert!(!bool_or_false(Some(&json!("true"))));
        assert!(items_or_empty(Some(&json!("nope"))).is_empty());
        assert!(object_or_empty(Some(&json!([1]))).is_empty());
        assert_eq!(number_or_none(Some(&json!("7"))), Some(Number::from(7)));
    }
}

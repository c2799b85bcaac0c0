use serde_json::Value;

use crate::form::value_ops::text_or_empty;
use crate::form::view::{KeyValueRow, Widget};

pub(crate) fn render_rows(value: Option<&Value>) -> Widget {
    let rows = value
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(key, value)| KeyValueRow {
                    key: key.clone(),
                    value: text_or_empty(Some(value)),
                })
                .collect()
        })
        .unwrap_or_default();
    Widget::KeyValue { rows }
}

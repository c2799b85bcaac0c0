use serde_json::Value;

use crate::domain::{FieldDescriptor, FieldPath};
use crate::form::field::FieldRenderer;
use crate::form::view::Widget;

/// Recurse into an object's children, each addressed below `path`.
pub(crate) fn render_group(
    renderer: &mut FieldRenderer<'_>,
    fields: &[FieldDescriptor],
    value: Option<&Value>,
    path: &FieldPath,
) -> Widget {
    let value = value.filter(|value| value.is_object());
    Widget::Group {
        fields: renderer.render_fields(fields, value, path),
    }
}

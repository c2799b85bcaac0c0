use serde_json::Value;

use crate::domain::{ArrayItemKind, FieldPath};
use crate::form::field::FieldRenderer;
use crate::form::value_ops::{items_or_empty, number_or_none, text_or_empty};
use crate::form::view::{ListItemView, Widget};

pub(crate) fn render_list(
    renderer: &mut FieldRenderer<'_>,
    kind: &ArrayItemKind,
    value: Option<&Value>,
    path: &FieldPath,
) -> Widget {
    let items = items_or_empty(value)
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let item_path = path.index(index);
            match kind {
                ArrayItemKind::Object(fields) => ListItemView::Object {
                    fields: renderer.render_fields(
                        fields,
                        Some(item).filter(|item| item.is_object()),
                        &item_path,
                    ),
                    path: item_path,
                },
                ArrayItemKind::Number => ListItemView::Number {
                    path: item_path,
                    value: number_or_none(Some(item)),
                },
                ArrayItemKind::String | ArrayItemKind::Other(_) => ListItemView::Text {
                    path: item_path,
                    value: text_or_empty(Some(item)),
                },
            }
        })
        .collect();

    Widget::List {
        item_kind: kind.tag().to_string(),
        items,
    }
}

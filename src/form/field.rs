pub(crate) mod components;

use serde_json::{Number, Value};
use tracing::debug;

use crate::domain::{
    ArrayItemKind, FieldDescriptor, FieldKind, FieldManifest, FieldNode, FieldPath,
};
use crate::resolver::OptionResolver;

use super::{
    actions::{EditAction, FormEdit},
    array,
    error::{FormError, FormResult},
    key_value,
    options::FormOptions,
    overlay::ErrorOverlay,
    value_ops::{parse_number, set_at, value_at},
    view::{FieldView, Widget},
};

/// Interprets descriptors against a value, one render pass at a time.
pub(crate) struct FieldRenderer<'a> {
    options: &'a FormOptions,
    errors: &'a ErrorOverlay,
    resolver: Option<&'a mut OptionResolver>,
}

impl<'a> FieldRenderer<'a> {
    pub(crate) fn new(
        options: &'a FormOptions,
        errors: &'a ErrorOverlay,
        resolver: Option<&'a mut OptionResolver>,
    ) -> Self {
        Self {
            options,
            errors,
            resolver,
        }
    }

    /// Render `fields` as children of `parent`, in manifest order, skipping hidden ones.
    pub(crate) fn render_fields(
        &mut self,
        fields: &[FieldDescriptor],
        parent: Option<&Value>,
        parent_path: &FieldPath,
    ) -> Vec<FieldView> {
        fields
            .iter()
            .filter_map(|field| {
                let value = parent.and_then(|parent| parent.get(&field.name));
                self.render_field(field, value, parent_path.child(&field.name))
            })
            .collect()
    }

    pub(crate) fn render_field(
        &mut self,
        field: &FieldDescriptor,
        value: Option<&Value>,
        path: FieldPath,
    ) -> Option<FieldView> {
        if field.hidden {
            return None;
        }

        let mut disabled = self.options.disabled;
        let mut placeholder = field.placeholder.clone();
        let widget = match &field.kind {
            FieldKind::String => components::text::render_text(value, false),
            FieldKind::Textarea => components::text::render_text(value, true),
            FieldKind::Number => components::text::render_number(value),
            FieldKind::Boolean => components::bool::render_toggle(value),
            FieldKind::Select(options) => components::choice::render_static(options, value),
            FieldKind::Resource { resource_type } => {
                let resource = components::choice::render_resource(
                    self,
                    resource_type.as_deref(),
                    value,
                    &path,
                );
                disabled |= resource.disabled;
                if resource.placeholder.is_some() {
                    placeholder = resource.placeholder;
                }
                resource.widget
            }
            FieldKind::Map => components::key_value::render_rows(value),
            FieldKind::Array(item) => components::array::render_list(self, item, value, &path),
            FieldKind::Object(fields) => components::object::render_group(self, fields, value, &path),
            FieldKind::Unsupported(kind) => {
                debug!(path = %path, kind = %kind, "unsupported field type");
                Widget::Unsupported {
                    kind: kind.clone(),
                    message: format!("{}: {kind}", self.options.labels.unsupported),
                }
            }
        };

        let error = self.errors.message_for(&path).map(str::to_string);
        let mut view = FieldView::new(field, path, disabled, error, widget);
        view.placeholder = placeholder;
        Some(view)
    }
}

/// Apply one edit to `root`, returning the new tree.
pub(crate) fn apply_edit(
    manifest: &FieldManifest,
    root: &Value,
    edit: &FormEdit,
) -> FormResult<Value> {
    let path = &edit.path;
    let resolved = manifest
        .descriptor_at(path)
        .ok_or_else(|| FormError::UnknownField(path.clone()))?;
    if resolved.hidden {
        return Err(FormError::HiddenField(path.clone()));
    }

    let current = value_at(root, path);
    let next = match resolved.node {
        FieldNode::Field(field) => apply_to_field(field, current, &edit.action, path)?,
        FieldNode::Item(item) => apply_to_item(item, &edit.action, path)?,
    };
    set_at(root, path, next)
}

fn apply_to_field(
    field: &FieldDescriptor,
    current: Option<&Value>,
    action: &EditAction,
    path: &FieldPath,
) -> FormResult<Option<Value>> {
    match (&field.kind, action) {
        (FieldKind::Number, EditAction::Replace { value }) if value.is_null() => Ok(None),
        (_, EditAction::Replace { value }) => Ok(Some(value.clone())),
        (FieldKind::String | FieldKind::Textarea, EditAction::SetText { text }) => {
            Ok(Some(Value::String(text.clone())))
        }
        (FieldKind::Number, EditAction::SetText { text }) => {
            Ok(number_from_text(text, path)?.map(Value::Number))
        }
        (FieldKind::Boolean, EditAction::Toggle { value }) => Ok(Some(Value::Bool(*value))),
        (FieldKind::Select(options), EditAction::Choose { value }) => {
            components::choice::choose_static(options, value, path)
        }
        (FieldKind::Resource { .. }, EditAction::Choose { value }) => {
            Ok(Some(Value::String(value.clone())))
        }
        (FieldKind::Map, action) => key_value::apply(current, action, path),
        (FieldKind::Array(item), action) => array::apply(item, current, action, path),
        (kind, action) => Err(FormError::UnsupportedEdit {
            path: path.clone(),
            action: action.name(),
            kind: kind.tag().to_string(),
        }),
    }
}

/// Edits addressed at an array item itself (`items[2]`).
fn apply_to_item(
    item: &ArrayItemKind,
    action: &EditAction,
    path: &FieldPath,
) -> FormResult<Option<Value>> {
    match (item, action) {
        (_, EditAction::Replace { value }) => Ok(Some(value.clone())),
        (ArrayItemKind::Number, EditAction::SetText { text }) => Ok(Some(Value::Number(
            number_from_text(text, path)?.unwrap_or_else(|| Number::from(0)),
        ))),
        (ArrayItemKind::String | ArrayItemKind::Other(_), EditAction::SetText { text }) => {
            Ok(Some(Value::String(text.clone())))
        }
        (kind, action) => Err(FormError::UnsupportedEdit {
            path: path.clone(),
            action: action.name(),
            kind: format!("{} item", kind.tag()),
        }),
    }
}

fn number_from_text(text: &str, path: &FieldPath) -> FormResult<Option<Number>> {
    parse_number(text).map_err(|message| FormError::Coercion {
        path: path.clone(),
        message,
    })
}

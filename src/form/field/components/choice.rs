use serde_json::Value;

use crate::domain::{FieldPath, SelectOption};
use crate::form::error::{FormError, FormResult};
use crate::form::field::FieldRenderer;
use crate::form::value_ops::text_or_empty;
use crate::form::view::{ChoiceSource, Widget};
use crate::resolver::LookupKey;

pub(crate) fn render_static(options: &[SelectOption], value: Option<&Value>) -> Widget {
    Widget::Choice {
        options: options.to_vec(),
        selected: selected(value),
        loading: false,
        source: ChoiceSource::Static,
    }
}

pub(crate) fn choose_static(
    options: &[SelectOption],
    value: &str,
    path: &FieldPath,
) -> FormResult<Option<Value>> {
    if options.iter().any(|option| option.value == value) {
        Ok(Some(Value::String(value.to_string())))
    } else {
        Err(FormError::UnknownOption {
            path: path.clone(),
            value: value.to_string(),
        })
    }
}

pub(crate) struct ResourceRender {
    pub(crate) widget: Widget,
    pub(crate) disabled: bool,
    pub(crate) placeholder: Option<String>,
}

/// A resource field is a closed choice whose options come from the resolver.
/// Without a complete context it is disabled and never looks anything up.
pub(crate) fn render_resource(
    renderer: &mut FieldRenderer<'_>,
    resource_type: Option<&str>,
    value: Option<&Value>,
    path: &FieldPath,
) -> ResourceRender {
    let options = renderer.options;
    let labels = &options.labels;
    let Some(key) = LookupKey::from_context(&options.context, resource_type) else {
        return ResourceRender {
            widget: resource_choice(Vec::new(), value, false),
            disabled: true,
            placeholder: Some(labels.no_resource_context.to_string()),
        };
    };

    let Some(resolver) = renderer.resolver.as_deref_mut() else {
        return ResourceRender {
            widget: resource_choice(Vec::new(), value, false),
            disabled: false,
            placeholder: None,
        };
    };

    let state = resolver.observe(path, key);
    ResourceRender {
        placeholder: state.loading.then(|| labels.loading.to_string()),
        disabled: state.loading,
        widget: resource_choice(state.options, value, state.loading),
    }
}

fn resource_choice(options: Vec<SelectOption>, value: Option<&Value>, loading: bool) -> Widget {
    Widget::Choice {
        options,
        selected: selected(value),
        loading,
        source: ChoiceSource::Resource,
    }
}

fn selected(value: Option<&Value>) -> Option<String> {
    Some(text_or_empty(value)).filter(|text| !text.is_empty())
}

use serde::Serialize;
use serde_json::Number;

use crate::domain::{FieldDescriptor, FieldPath, SelectOption};

/// Result of interpreting a manifest against a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FormView {
    /// The manifest declares no fields at all.
    Notice { message: String },
    Fields { fields: Vec<FieldView> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub path: FieldPath,
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub placeholder: Option<String>,
    pub required: bool,
    pub disabled: bool,
    pub error: Option<String>,
    pub widget: Widget,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    TextInput {
        value: String,
        multiline: bool,
    },
    NumberInput {
        value: Option<Number>,
    },
    Toggle {
        value: bool,
    },
    Choice {
        options: Vec<SelectOption>,
        selected: Option<String>,
        loading: bool,
        source: ChoiceSource,
    },
    KeyValue {
        rows: Vec<KeyValueRow>,
    },
    List {
        item_kind: String,
        items: Vec<ListItemView>,
    },
    Group {
        fields: Vec<FieldView>,
    },
    Unsupported {
        kind: String,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceSource {
    Static,
    Resource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyValueRow {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum ListItemView {
    Text { path: FieldPath, value: String },
    Number { path: FieldPath, value: Option<Number> },
    Object { path: FieldPath, fields: Vec<FieldView> },
}

impl FormView {
    pub fn is_notice(&self) -> bool {
        matches!(self, FormView::Notice { .. })
    }

    pub fn fields(&self) -> &[FieldView] {
        match self {
            FormView::Notice { .. } => &[],
            FormView::Fields { fields } => fields,
        }
    }

    /// Depth-first search for the view rendered at `path`.
    pub fn find(&self, path: &FieldPath) -> Option<&FieldView> {
        find_in(self.fields(), path)
    }

    /// Every field view in render order, nested ones included.
    pub fn walk(&self) -> Vec<&FieldView> {
        let mut acc = Vec::new();
        collect(self.fields(), &mut acc);
        acc
    }
}

impl FieldView {
    pub(crate) fn new(
        field: &FieldDescriptor,
        path: FieldPath,
        disabled: bool,
        error: Option<String>,
        widget: Widget,
    ) -> Self {
        Self {
            path,
            name: field.name.clone(),
            label: field.label().to_string(),
            description: field.description.clone(),
            placeholder: field.placeholder.clone(),
            required: field.required,
            disabled,
            error,
            widget,
        }
    }

    pub fn children(&self) -> Vec<&FieldView> {
        match &self.widget {
            Widget::Group { fields } => fields.iter().collect(),
            Widget::List { items, .. } => items
                .iter()
                .flat_map(|item| match item {
                    ListItemView::Object { fields, .. } => fields.iter().collect::<Vec<_>>(),
                    _ => Vec::new(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl ListItemView {
    pub fn path(&self) -> &FieldPath {
        match self {
            ListItemView::Text { path, .. }
            | ListItemView::Number { path, .. }
            | ListItemView::Object { path, .. } => path,
        }
    }
}

fn find_in<'a>(fields: &'a [FieldView], path: &FieldPath) -> Option<&'a FieldView> {
    for field in fields {
        if &field.path == path {
            return Some(field);
        }
        if let Some(found) = field
            .children()
            .into_iter()
            .find_map(|child| find_in(std::slice::from_ref(child), path))
        {
            return Some(found);
        }
    }
    None
}

fn collect<'a>(fields: &'a [FieldView], acc: &mut Vec<&'a FieldView>) {
    for field in fields {
        acc.push(field);
        for child in field.children() {
            collect(std::slice::from_ref(child), acc);
        }
    }
}

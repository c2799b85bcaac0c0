use serde::{Deserialize, Serialize};

use super::parser::RawManifest;
use super::path::{FieldPath, PathSegment};

/// An ordered list of field descriptors describing one configuration shape.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawManifest")]
pub struct FieldManifest {
    pub display_name: Option<String>,
    /// Free-form manifest type tag (component, trigger, ...). Presentation only.
    pub manifest_type: Option<String>,
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub placeholder: Option<String>,
    /// Advisory only; enforcement belongs to the external validator.
    pub required: bool,
    pub hidden: bool,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Textarea,
    Select(Vec<SelectOption>),
    Resource { resource_type: Option<String> },
    Map,
    Array(ArrayItemKind),
    Object(Vec<FieldDescriptor>),
    Unsupported(String),
}

/// Shape of every element of an `array` field.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayItemKind {
    String,
    Number,
    Object(Vec<FieldDescriptor>),
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// An option whose label is its value, as resource options are.
    pub fn same(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// Read-only ambient data threaded through every level of a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DynamicFormContext {
    pub integration_name: Option<String>,
    pub organization_id: Option<String>,
    pub canvas_id: Option<String>,
}

impl DynamicFormContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_integration(mut self, name: impl Into<String>) -> Self {
        self.integration_name = Some(name.into());
        self
    }

    pub fn with_organization(mut self, id: impl Into<String>) -> Self {
        self.organization_id = Some(id.into());
        self
    }

    pub fn with_canvas(mut self, id: impl Into<String>) -> Self {
        self.canvas_id = Some(id.into());
        self
    }
}

/// What a [`FieldPath`] points at inside a manifest.
#[derive(Debug, Clone, Copy)]
pub enum FieldNode<'a> {
    Field(&'a FieldDescriptor),
    Item(&'a ArrayItemKind),
}

#[derive(Debug, Clone, Copy)]
pub struct ResolvedField<'a> {
    pub node: FieldNode<'a>,
    /// True when the target or any ancestor is hidden.
    pub hidden: bool,
}

impl FieldManifest {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            display_name: None,
            manifest_type: None,
            fields,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolve the descriptor a path addresses. Index segments step into the
    /// item shape of the enclosing array field.
    pub fn descriptor_at(&self, path: &FieldPath) -> Option<ResolvedField<'_>> {
        let mut current: Option<FieldNode<'_>> = None;
        let mut hidden = false;
        for segment in path.segments() {
            match segment {
                PathSegment::Key(name) => {
                    let fields = match current {
                        None => self.fields.as_slice(),
                        Some(FieldNode::Field(FieldDescriptor {
                            kind: FieldKind::Object(fields),
                            ..
                        })) => fields.as_slice(),
                        Some(FieldNode::Item(ArrayItemKind::Object(fields))) => fields.as_slice(),
                        Some(_) => return None,
                    };
                    let field = fields.iter().find(|field| &field.name == name)?;
                    hidden |= field.hidden;
                    current = Some(FieldNode::Field(field));
                }
                PathSegment::Index(_) => match current {
                    Some(FieldNode::Field(FieldDescriptor {
                        kind: FieldKind::Array(item),
                        ..
                    })) => current = Some(FieldNode::Item(item)),
                    _ => return None,
                },
            }
        }
        current.map(|node| ResolvedField { node, hidden })
    }
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: None,
            placeholder: None,
            required: false,
            hidden: false,
            kind,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.name)
    }
}

impl FieldKind {
    /// The manifest tag this kind was parsed from.
    pub fn tag(&self) -> &str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Textarea => "textarea",
            FieldKind::Select(_) => "select",
            FieldKind::Resource { .. } => "resource",
            FieldKind::Map => "map",
            FieldKind::Array(_) => "array",
            FieldKind::Object(_) => "object",
            FieldKind::Unsupported(tag) => tag,
        }
    }
}

impl ArrayItemKind {
    pub fn tag(&self) -> &str {
        match self {
            ArrayItemKind::String => "string",
            ArrayItemKind::Number => "number",
            ArrayItemKind::Object(_) => "object",
            ArrayItemKind::Other(tag) => tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> FieldManifest {
        FieldManifest::new(vec![
            FieldDescriptor::new("name", FieldKind::String),
            FieldDescriptor::new(
                "servers",
                FieldKind::Array(ArrayItemKind::Object(vec![
                    FieldDescriptor::new("host", FieldKind::String),
                    FieldDescriptor::new("secret", FieldKind::String).hidden(),
                ])),
            ),
            FieldDescriptor::new(
                "advanced",
                FieldKind::Object(vec![FieldDescriptor::new("retries", FieldKind::Number)]),
            )
            .hidden(),
        ])
    }

    #[test]
    fn resolves_nested_item_fields() {
        let manifest = manifest();
        let path: FieldPath = "servers[3].host".parse().expect("path");
        let resolved = manifest.descriptor_at(&path).expect("resolved");
        assert!(!resolved.hidden);
        match resolved.node {
            FieldNode::Field(field) => assert_eq!(field.name, "host"),
            other => panic!("expected field, got {other:?}"),
        }

        let item = manifest
            .descriptor_at(&"servers[0]".parse().expect("path"))
            .expect("item");
        assert!(matches!(item.node, FieldNode::Item(ArrayItemKind::Object(_))));
    }

    #[test]
    fn hidden_ancestors_mark_descendants() {
        let manifest = manifest();
        let retries = manifest
            .descriptor_at(&"advanced.retries".parse().expect("path"))
            .expect("retries");
        assert!(retries.hidden);
        let secret = manifest
            .descriptor_at(&"servers[0].secret".parse().expect("path"))
            .expect("secret");
        assert!(secret.hidden);
    }

    #[test]
    fn unknown_paths_do_not_resolve() {
        let manifest = manifest();
        assert!(manifest.descriptor_at(&"missing".parse().expect("path")).is_none());
        assert!(manifest.descriptor_at(&"name[0]".parse().expect("path")).is_none());
        assert!(manifest.descriptor_at(&"name.inner".parse().expect("path")).is_none());
        assert!(manifest.descriptor_at(&FieldPath::root()).is_none());
    }

    #[test]
    fn label_falls_back_to_name() {
        let plain = FieldDescriptor::new("region", FieldKind::String);
        assert_eq!(plain.label(), "region");
        let titled = plain.with_display_name("Region");
        assert_eq!(titled.label(), "Region");
    }
}

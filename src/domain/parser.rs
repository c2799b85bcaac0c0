use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::schema::{ArrayItemKind, FieldDescriptor, FieldKind, FieldManifest, SelectOption};

/// Parse a manifest document (`{fields, displayName?, type?}`) into a [`FieldManifest`].
///
/// Absent keys fall back to their empty value; unknown field types are kept as
/// [`FieldKind::Unsupported`] so they can be surfaced instead of dropped.
pub fn parse_manifest(value: &Value) -> Result<FieldManifest> {
    let raw: RawManifest =
        serde_json::from_value(value.clone()).context("failed to read field manifest")?;
    Ok(raw.into())
}

/// JSON Schema describing the manifest document format.
pub fn manifest_schema() -> Value {
    let schema = schemars::schema_for!(RawManifest);
    serde_json::to_value(schema).unwrap_or(Value::Null)
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
#[schemars(rename = "FieldManifest")]
pub(crate) struct RawManifest {
    display_name: Option<String>,
    #[serde(rename = "type")]
    manifest_type: Option<String>,
    fields: Option<Vec<RawField>>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
#[schemars(rename = "FieldDescriptor")]
struct RawField {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(alias = "label")]
    display_name: Option<String>,
    description: Option<String>,
    placeholder: Option<String>,
    required: Option<bool>,
    hidden: Option<bool>,
    options: Option<Vec<RawOption>>,
    resource_type: Option<String>,
    item_type: Option<String>,
    fields: Option<Vec<RawField>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(rename = "SelectOption")]
struct RawOption {
    value: String,
    label: Option<String>,
}

impl From<RawManifest> for FieldManifest {
    fn from(raw: RawManifest) -> Self {
        FieldManifest {
            display_name: raw.display_name,
            manifest_type: raw.manifest_type,
            fields: convert_fields(raw.fields),
        }
    }
}

/// Fields without a name address no slot of the value tree and are skipped.
fn convert_fields(fields: Option<Vec<RawField>>) -> Vec<FieldDescriptor> {
    fields
        .unwrap_or_default()
        .into_iter()
        .filter(|raw| {
            let named = raw.name.as_deref().is_some_and(|name| !name.is_empty());
            if !named {
                debug!(
                    kind = raw.kind.as_deref().unwrap_or("unspecified"),
                    "skipping unnamed field"
                );
            }
            named
        })
        .map(FieldDescriptor::from)
        .collect()
}

impl From<RawField> for FieldDescriptor {
    fn from(raw: RawField) -> Self {
        let kind = match raw.kind.as_deref() {
            Some("string") => FieldKind::String,
            Some("number") => FieldKind::Number,
            Some("boolean") => FieldKind::Boolean,
            Some("textarea") => FieldKind::Textarea,
            Some("select") => FieldKind::Select(
                raw.options
                    .unwrap_or_default()
                    .into_iter()
                    .map(|option| {
                        let label = option.label.unwrap_or_else(|| option.value.clone());
                        SelectOption::new(option.value, label)
                    })
                    .collect(),
            ),
            Some("resource") => FieldKind::Resource {
                resource_type: raw.resource_type.filter(|value| !value.is_empty()),
            },
            Some("map") => FieldKind::Map,
            Some("array") => FieldKind::Array(match raw.item_type.as_deref() {
                None | Some("string") => ArrayItemKind::String,
                Some("number") => ArrayItemKind::Number,
                Some("object") => ArrayItemKind::Object(convert_fields(raw.fields)),
                Some(other) => ArrayItemKind::Other(other.to_string()),
            }),
            Some("object") => FieldKind::Object(convert_fields(raw.fields)),
            Some(other) => FieldKind::Unsupported(other.to_string()),
            None => FieldKind::Unsupported("unspecified".to_string()),
        };

        FieldDescriptor {
            name: raw.name.unwrap_or_default(),
            display_name: raw.display_name,
            description: raw.description,
            placeholder: raw.placeholder,
            required: raw.required.unwrap_or(false),
            hidden: raw.hidden.unwrap_or(false),
            kind,
        }
    }
}

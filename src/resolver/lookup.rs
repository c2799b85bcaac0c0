use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;
use tracing::warn;

use crate::domain::{DynamicFormContext, SelectOption};

/// Identity of one inventory lookup. A resource field issues at most one
/// lookup per distinct key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupKey {
    pub integration_name: String,
    pub canvas_id: String,
    pub resource_type: String,
}

impl LookupKey {
    pub fn new(
        integration_name: impl Into<String>,
        canvas_id: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            integration_name: integration_name.into(),
            canvas_id: canvas_id.into(),
            resource_type: resource_type.into(),
        }
    }

    /// `None` unless the resource type, integration and canvas are all present
    /// and non-empty.
    pub fn from_context(context: &DynamicFormContext, resource_type: Option<&str>) -> Option<Self> {
        let present = |value: Option<&str>| value.filter(|text| !text.is_empty()).map(str::to_string);
        Some(Self {
            integration_name: present(context.integration_name.as_deref())?,
            canvas_id: present(context.canvas_id.as_deref())?,
            resource_type: present(resource_type)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default)]
    pub name: Option<String>,
    /// Numeric ids are kept in their decimal form.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) => Ok(Some(id)),
        Some(Value::Number(id)) => Ok(Some(id.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string or number id, found {other}"
        ))),
    }
}

impl InventoryItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            id: None,
        }
    }

    /// The item's name, falling back to its id.
    pub fn option_value(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.id.as_deref().filter(|id| !id.is_empty()))
    }
}

pub(crate) fn options_from_items(items: &[InventoryItem]) -> Vec<SelectOption> {
    items
        .iter()
        .filter_map(InventoryItem::option_value)
        .map(SelectOption::same)
        .collect()
}

/// External inventory of a connected integration.
#[async_trait]
pub trait InventoryLookup: Send + Sync {
    async fn list_resources(&self, key: &LookupKey) -> Result<Vec<InventoryItem>>;
}

/// Inventory served from a document, either `{resourceType: [items]}` or
/// `{integration: {resourceType: [items]}}`.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    document: Value,
}

impl StaticInventory {
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    fn items_for(&self, key: &LookupKey) -> Option<&Vec<Value>> {
        self.document
            .get(&key.integration_name)
            .and_then(|scoped| scoped.get(&key.resource_type))
            .and_then(Value::as_array)
            .or_else(|| {
                self.document
                    .get(&key.resource_type)
                    .and_then(Value::as_array)
            })
    }
}

#[async_trait]
impl InventoryLookup for StaticInventory {
    async fn list_resources(&self, key: &LookupKey) -> Result<Vec<InventoryItem>> {
        let Some(items) = self.items_for(key) else {
            bail!(
                "no '{}' inventory for integration '{}'",
                key.resource_type,
                key.integration_name
            );
        };
        let items = items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match InventoryItem::deserialize(item) {
                Ok(item) => Some(item),
                Err(err) => {
                    warn!(
                        resource_type = %key.resource_type,
                        index,
                        error = %err,
                        "skipping malformed inventory item"
                    );
                    None
                }
            })
            .collect();
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn key_requires_full_context() {
        let full = DynamicFormContext::new()
            .with_integration("github")
            .with_canvas("c1");
        assert_eq!(
            LookupKey::from_context(&full, Some("repository")),
            Some(LookupKey::new("github", "c1", "repository"))
        );
        assert_eq!(LookupKey::from_context(&full, None), None);
        assert_eq!(LookupKey::from_context(&full, Some("")), None);
        let partial = DynamicFormContext::new().with_integration("github");
        assert_eq!(LookupKey::from_context(&partial, Some("repository")), None);
        let blank = DynamicFormContext::new()
            .with_integration("")
            .with_canvas("c1");
        assert_eq!(LookupKey::from_context(&blank, Some("repository")), None);
    }

    #[test]
    fn options_use_name_then_id() {
        let items = vec![
            InventoryItem::named("api"),
            InventoryItem {
                name: Some(String::new()),
                id: Some("id-2".into()),
            },
            InventoryItem::default(),
        ];
        assert_eq!(
            options_from_items(&items),
            vec![SelectOption::same("api"), SelectOption::same("id-2")]
        );
    }

    #[tokio::test]
    async fn static_inventory_prefers_integration_scope() {
        let inventory = StaticInventory::new(json!({
            "github": {"repository": [{"name": "scoped"}]},
            "repository": [{"id": "global"}]
        }));
        let scoped = inventory
            .list_resources(&LookupKey::new("github", "c", "repository"))
            .await
            .expect("scoped");
        assert_eq!(scoped, vec![InventoryItem::named("scoped")]);
        let global = inventory
            .list_resources(&LookupKey::new("gitlab", "c", "repository"))
            .await
            .expect("global");
        assert_eq!(global[0].option_value(), Some("global"));
        assert!(
            inventory
                .list_resources(&LookupKey::new("github", "c", "missing"))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn numeric_ids_and_malformed_items() {
        let inventory = StaticInventory::new(json!({
            "repository": [
                {"name": "api"},
                {"id": 42},
                {"id": {"nested": true}},
                "not an item",
                {"name": "web", "id": 7}
            ]
        }));
        let items = inventory
            .list_resources(&LookupKey::new("github", "c", "repository"))
            .await
            .expect("items");
        assert_eq!(
            options_from_items(&items),
            vec![
                SelectOption::same("api"),
                SelectOption::same("42"),
                SelectOption::same("web")
            ]
        );
        assert_eq!(items[2].id.as_deref(), Some("7"));
    }
}

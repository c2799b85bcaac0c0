use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::FieldPath;

/// One user gesture, addressed by the path of the editor it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormEdit {
    pub path: FieldPath,
    #[serde(flatten)]
    pub action: EditAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditAction {
    /// Replace the slice wholesale.
    Replace { value: Value },
    SetText { text: String },
    Toggle { value: bool },
    Choose { value: String },
    MapAdd,
    MapRemove { key: String },
    MapRename { from: String, to: String },
    MapSetValue { key: String, value: String },
    ArrayAdd,
    ArrayRemove { index: usize },
    ArrayReplace { index: usize, value: Value },
}

impl FormEdit {
    pub fn new(path: FieldPath, action: EditAction) -> Self {
        Self { path, action }
    }

    pub fn replace(path: FieldPath, value: Value) -> Self {
        Self::new(path, EditAction::Replace { value })
    }

    pub fn set_text(path: FieldPath, text: impl Into<String>) -> Self {
        Self::new(path, EditAction::SetText { text: text.into() })
    }

    pub fn toggle(path: FieldPath, value: bool) -> Self {
        Self::new(path, EditAction::Toggle { value })
    }

    pub fn choose(path: FieldPath, value: impl Into<String>) -> Self {
        Self::new(path, EditAction::Choose { value: value.into() })
    }
}

impl EditAction {
    pub fn name(&self) -> &'static str {
        match self {
            EditAction::Replace { .. } => "replace",
            EditAction::SetText { .. } => "set_text",
            EditAction::Toggle { .. } => "toggle",
            EditAction::Choose { .. } => "choose",
            EditAction::MapAdd => "map_add",
            EditAction::MapRemove { .. } => "map_remove",
            EditAction::MapRename { .. } => "map_rename",
            EditAction::MapSetValue { .. } => "map_set_value",
            EditAction::ArrayAdd => "array_add",
            EditAction::ArrayRemove { .. } => "array_remove",
            EditAction::ArrayReplace { .. } => "array_replace",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn edits_read_from_flat_documents() {
        let edit: FormEdit = serde_json::from_value(json!({
            "path": "labels",
            "type": "map_rename",
            "from": "a",
            "to": "b"
        }))
        .expect("edit");
        assert_eq!(edit.path, FieldPath::key("labels"));
        assert_eq!(
            edit.action,
            EditAction::MapRename {
                from: "a".into(),
                to: "b".into()
            }
        );

        let edit: FormEdit =
            serde_json::from_value(json!({"path": "ports", "type": "array_add"})).expect("edit");
        assert_eq!(edit.action.name(), "array_add");
    }
}

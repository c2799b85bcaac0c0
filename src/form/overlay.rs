use indexmap::IndexMap;
use jsonschema::Validator;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::FieldPath;

/// Validation messages keyed by field path (`name`, `a.b`, `items[0].url`).
///
/// Messages come from an external validator; the form only displays them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorOverlay {
    messages: IndexMap<String, String>,
}

impl ErrorOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every error `validator` reports for `value`, keeping the first
    /// message per path. Errors at the document root are kept under the empty key.
    pub fn from_validator(validator: &Validator, value: &Value) -> Self {
        let mut overlay = Self::new();
        for error in validator.iter_errors(value) {
            let pointer = error.instance_path.to_string();
            let key = FieldPath::from_pointer(&pointer)
                .map(|path| path.to_string())
                .unwrap_or(pointer);
            overlay.messages.entry(key).or_insert_with(|| error.to_string());
        }
        overlay
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }

    pub fn with(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert(key, message);
        self
    }

    /// Add every message from `other` whose path has none here yet.
    pub fn merge(&mut self, other: ErrorOverlay) {
        for (key, message) in other.messages {
            self.messages.entry(key).or_insert(message);
        }
    }

    /// The non-empty message recorded for `path`, if any.
    pub fn message_for(&self, path: &FieldPath) -> Option<&str> {
        self.messages
            .get(&path.to_string())
            .map(String::as_str)
            .filter(|message| !message.is_empty())
    }

    /// Messages that no field can claim (recorded against the document root).
    pub fn global_messages(&self) -> Option<&str> {
        self.messages
            .get("")
            .map(String::as_str)
            .filter(|message| !message.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.messages
            .iter()
            .map(|(key, message)| (key.as_str(), message.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ErrorOverlay {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            messages: iter
                .into_iter()
                .map(|(key, message)| (key.into(), message.into()))
                .collect(),
        }
    }
}

use std::borrow::Cow;

use crate::domain::DynamicFormContext;

/// Fixed strings the form shows in place of an editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLabels {
    pub no_configuration: Cow<'static, str>,
    pub loading: Cow<'static, str>,
    pub no_resource_context: Cow<'static, str>,
    pub unsupported: Cow<'static, str>,
}

impl Default for FormLabels {
    fn default() -> Self {
        Self {
            no_configuration: Cow::Borrowed("No configuration required"),
            loading: Cow::Borrowed("Loading..."),
            no_resource_context: Cow::Borrowed("No resource context available"),
            unsupported: Cow::Borrowed("Unsupported field type"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormOptions {
    pub disabled: bool,
    pub context: DynamicFormContext,
    pub labels: FormLabels,
}

impl FormOptions {
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_context(mut self, context: DynamicFormContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_labels(mut self, labels: FormLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_no_configuration_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.labels.no_configuration = label.into();
        self
    }
}

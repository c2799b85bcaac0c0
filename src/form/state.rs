use anyhow::Result;
use serde_json::Value;

use crate::domain::{FieldManifest, FieldPath, parse_manifest};
use crate::resolver::OptionResolver;

use super::{
    actions::FormEdit,
    error::FormResult,
    field::{FieldRenderer, apply_edit},
    options::FormOptions,
    overlay::ErrorOverlay,
    view::FormView,
};

/// Top-level form: a manifest plus the options every render shares.
///
/// The value tree stays with the caller. `render` reads it, `apply` returns a
/// new tree for every edit.
#[derive(Debug, Clone, Default)]
pub struct DynamicForm {
    manifest: FieldManifest,
    options: FormOptions,
}

impl DynamicForm {
    pub fn new(manifest: FieldManifest) -> Self {
        Self {
            manifest,
            options: FormOptions::default(),
        }
    }

    /// Build a form from a manifest document.
    pub fn from_document(document: &Value) -> Result<Self> {
        Ok(Self::new(parse_manifest(document)?))
    }

    pub fn with_options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    pub fn manifest(&self) -> &FieldManifest {
        &self.manifest
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut FormOptions {
        &mut self.options
    }

    /// Render without an inventory: resource fields never load options.
    pub fn render(&self, value: &Value, errors: &ErrorOverlay) -> FormView {
        self.render_inner(value, errors, None)
    }

    /// Render and drive `resolver`: resource fields observed in this pass
    /// start their lookups, fields no longer rendered release theirs.
    pub fn render_with(
        &self,
        value: &Value,
        errors: &ErrorOverlay,
        resolver: &mut OptionResolver,
    ) -> FormView {
        resolver.begin_pass();
        let view = self.render_inner(value, errors, Some(&mut *resolver));
        resolver.end_pass();
        view
    }

    fn render_inner(
        &self,
        value: &Value,
        errors: &ErrorOverlay,
        resolver: Option<&mut OptionResolver>,
    ) -> FormView {
        if self.manifest.is_empty() {
            return FormView::Notice {
                message: self.options.labels.no_configuration.to_string(),
            };
        }
        let mut renderer = FieldRenderer::new(&self.options, errors, resolver);
        FormView::Fields {
            fields: renderer.render_fields(&self.manifest.fields, Some(value), &FieldPath::root()),
        }
    }

    /// Apply `edit` to `root` and return the new tree. `root` is left untouched.
    pub fn apply(&self, root: &Value, edit: &FormEdit) -> FormResult<Value> {
        apply_edit(&self.manifest, root, edit)
    }

    /// Apply edits in order, each one seeing the tree produced by the previous.
    pub fn apply_all<'e>(
        &self,
        root: &Value,
        edits: impl IntoIterator<Item = &'e FormEdit>,
    ) -> FormResult<Value> {
        edits
            .into_iter()
            .try_fold(root.clone(), |current, edit| self.apply(&current, edit))
    }
}

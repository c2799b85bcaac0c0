#![deny(rust_2018_idioms)]

pub mod domain;
pub mod form;
pub mod io;
pub mod presentation;
pub mod resolver;

pub use domain::{
    DynamicFormContext, FieldDescriptor, FieldKind, FieldManifest, FieldPath, SelectOption,
    manifest_schema, parse_manifest,
};
pub use form::{
    DynamicForm, EditAction, ErrorOverlay, FieldView, FormEdit, FormError, FormLabels,
    FormOptions, FormResult, FormView, Widget,
};
pub use io::{DocumentFormat, OutputDestination, OutputOptions, emit, parse_document_str};
pub use presentation::{form_lines, plain_text, render_form};
pub use resolver::{InventoryItem, InventoryLookup, LookupKey, OptionResolver, StaticInventory};

pub mod prelude {
    pub use super::{
        DynamicForm, DynamicFormContext, EditAction, ErrorOverlay, FieldPath, FormEdit,
        FormOptions, FormView, OptionResolver, Widget,
    };
}

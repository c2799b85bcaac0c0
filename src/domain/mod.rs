mod parser;
mod path;
mod schema;

pub use parser::{manifest_schema, parse_manifest};
pub use path::{FieldPath, PathParseError, PathSegment};
pub use schema::{
    ArrayItemKind, DynamicFormContext, FieldDescriptor, FieldKind, FieldManifest, FieldNode,
    ResolvedField, SelectOption,
};

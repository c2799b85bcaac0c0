use thiserror::Error;

use crate::domain::{FieldPath, PathParseError};

#[derive(Debug, Error)]
pub enum FormError {
    #[error("no field at '{0}'")]
    UnknownField(FieldPath),

    #[error("field '{0}' is hidden")]
    HiddenField(FieldPath),

    #[error("{path}: cannot apply '{action}' to a {kind} field")]
    UnsupportedEdit {
        path: FieldPath,
        action: &'static str,
        kind: String,
    },

    #[error("{path}: {message}")]
    Coercion { path: FieldPath, message: String },

    #[error("{path}: '{value}' is not one of the declared options")]
    UnknownOption { path: FieldPath, value: String },

    #[error("{path}: index {index} is out of bounds for {len} item(s)")]
    IndexOutOfBounds {
        path: FieldPath,
        index: usize,
        len: usize,
    },

    #[error(transparent)]
    InvalidPath(#[from] PathParseError),

    #[error("resource lookups need a running tokio runtime")]
    NoRuntime(#[source] tokio::runtime::TryCurrentError),
}

pub type FormResult<T> = Result<T, FormError>;

mod actions;
pub mod array;
mod error;
mod field;
pub mod key_value;
mod options;
mod overlay;
mod state;
pub mod value_ops;
mod view;

pub use actions::{EditAction, FormEdit};
pub use error::{FormError, FormResult};
pub use options::{FormLabels, FormOptions};
pub use overlay::ErrorOverlay;
pub use state::DynamicForm;
pub use view::{ChoiceSource, FieldView, FormView, KeyValueRow, ListItemView, Widget};

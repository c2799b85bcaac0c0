pub(crate) mod array;
pub(crate) mod bool;
pub(crate) mod choice;
pub(crate) mod key_value;
pub(crate) mod object;
pub(crate) mod text;

use serde_json::Value;

use crate::form::value_ops::{number_or_none, text_or_empty};
use crate::form::view::Widget;

pub(crate) fn render_text(value: Option<&Value>, multiline: bool) -> Widget {
    Widget::TextInput {
        value: text_or_empty(value),
        multiline,
    }
}

pub(crate) fn render_number(value: Option<&Value>) -> Widget {
    Widget::NumberInput {
        value: number_or_none(value),
    }
}

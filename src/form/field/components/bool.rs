use serde_json::Value;

use crate::form::value_ops::bool_or_false;
use crate::form::view::Widget;

pub(crate) fn render_toggle(value: Option<&Value>) -> Widget {
    Widget::Toggle {
        value: bool_or_false(value),
    }
}

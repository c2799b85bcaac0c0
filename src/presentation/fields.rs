use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use serde_json::Number;
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use crate::form::{ChoiceSource, FieldView, FormView, KeyValueRow, ListItemView, Widget};

const INDENT: usize = 2;

/// Lay out a form view as styled terminal lines, `width` columns wide.
pub fn form_lines(view: &FormView, width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width.max(8));
    match view {
        FormView::Notice { message } => vec![Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Gray),
        ))],
        FormView::Fields { fields } => {
            let mut lines = Vec::new();
            for field in fields {
                field_lines(field, 0, width, &mut lines);
            }
            lines
        }
    }
}

fn field_lines(field: &FieldView, depth: usize, width: usize, lines: &mut Vec<Line<'static>>) {
    let pad = " ".repeat(depth * INDENT);
    lines.push(label_line(field, &pad));

    if let Some(description) = field.description.as_deref().filter(|d| !d.is_empty()) {
        let wrap_width = width.saturating_sub(pad.len() + INDENT).max(4);
        for segment in wrap(description, wrap_width) {
            lines.push(Line::from(Span::styled(
                format!("{pad}  {segment}"),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let value_style = if field.disabled {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };

    match &field.widget {
        Widget::TextInput { value, multiline } => {
            if value.is_empty() {
                lines.push(placeholder_line(&pad, field.placeholder.as_deref()));
            } else if *multiline {
                for row in value.lines() {
                    lines.push(value_line(&pad, row.to_string(), value_style));
                }
            } else {
                lines.push(value_line(&pad, value.clone(), value_style));
            }
        }
        Widget::NumberInput { value } => match value {
            Some(number) => lines.push(value_line(&pad, number.to_string(), value_style)),
            None => lines.push(placeholder_line(&pad, field.placeholder.as_deref())),
        },
        Widget::Toggle { value } => {
            let mark = if *value { "[x]" } else { "[ ]" };
            lines.push(value_line(&pad, mark.to_string(), value_style));
        }
        Widget::Choice {
            options,
            selected,
            loading,
            source,
        } => {
            if *loading || (options.is_empty() && *source == ChoiceSource::Resource) {
                lines.push(placeholder_line(&pad, field.placeholder.as_deref()));
            }
            if let Some(selected) = selected {
                let label = options
                    .iter()
                    .find(|option| &option.value == selected)
                    .map(|option| option.label.clone())
                    .unwrap_or_else(|| selected.clone());
                lines.push(value_line(&pad, format!("> {label}"), value_style));
            } else if !options.is_empty() {
                let choices = options
                    .iter()
                    .map(|option| option.label.as_str())
                    .collect::<Vec<_>>()
                    .join(" | ");
                lines.push(Line::from(vec![
                    Span::raw(format!("{pad}  ")),
                    Span::styled(choices, Style::default().fg(Color::Gray)),
                ]));
            }
        }
        Widget::KeyValue { rows } => key_value_lines(rows, &pad, value_style, lines),
        Widget::List { items, .. } => {
            if items.is_empty() {
                lines.push(placeholder_line(&pad, Some("(empty)")));
            }
            for (idx, item) in items.iter().enumerate() {
                match item {
                    ListItemView::Text { value, .. } => {
                        lines.push(value_line(&pad, format!("- {value}"), value_style));
                    }
                    ListItemView::Number { value, .. } => {
                        let text = value.as_ref().map(Number::to_string).unwrap_or_default();
                        lines.push(value_line(&pad, format!("- {text}"), value_style));
                    }
                    ListItemView::Object { fields, .. } => {
                        lines.push(Line::from(Span::styled(
                            format!("{pad}  #{}", idx + 1),
                            Style::default().fg(Color::Magenta),
                        )));
                        for child in fields {
                            field_lines(child, depth + 2, width, lines);
                        }
                    }
                }
            }
        }
        Widget::Group { fields } => {
            for child in fields {
                field_lines(child, depth + 1, width, lines);
            }
        }
        Widget::Unsupported { message, .. } => {
            lines.push(Line::from(Span::styled(
                format!("{pad}  {message}"),
                Style::default().fg(Color::Yellow),
            )));
        }
    }

    if let Some(error) = &field.error {
        let wrap_width = width.saturating_sub(pad.len() + 4).max(4);
        for segment in wrap(error, wrap_width) {
            lines.push(Line::from(Span::styled(
                format!("{pad}  ! {segment}"),
                Style::default().fg(Color::Red),
            )));
        }
    }
}

fn label_line(field: &FieldView, pad: &str) -> Line<'static> {
    let style = if field.error.is_some() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    };
    let mut spans = vec![Span::raw(pad.to_string()), Span::styled(field.label.clone(), style)];
    if field.required {
        spans.push(Span::styled(" *", Style::default().fg(Color::Red)));
    }
    if field.disabled {
        spans.push(Span::styled(
            " (disabled)",
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn value_line(pad: &str, text: String, style: Style) -> Line<'static> {
    Line::from(vec![Span::raw(format!("{pad}  ")), Span::styled(text, style)])
}

fn placeholder_line(pad: &str, placeholder: Option<&str>) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("{pad}  ")),
        Span::styled(
            placeholder.unwrap_or_default().to_string(),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ),
    ])
}

fn key_value_lines(rows: &[KeyValueRow], pad: &str, style: Style, lines: &mut Vec<Line<'static>>) {
    if rows.is_empty() {
        lines.push(placeholder_line(pad, Some("(no entries)")));
        return;
    }
    let key_width = rows
        .iter()
        .map(|row| UnicodeWidthStr::width(row.key.as_str()))
        .max()
        .unwrap_or(0);
    for row in rows {
        let mut key = row.key.clone();
        let mut current = UnicodeWidthStr::width(key.as_str());
        while current < key_width {
            key.push(' ');
            current += 1;
        }
        lines.push(Line::from(vec![
            Span::raw(format!("{pad}  ")),
            Span::styled(key, Style::default().fg(Color::Cyan)),
            Span::styled(" = ", Style::default().fg(Color::DarkGray)),
            Span::styled(row.value.clone(), style),
        ]));
    }
}

mod fields;

use ratatui::{
    Frame,
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Paragraph},
};

use crate::form::FormView;

pub use fields::form_lines;

/// Draw a rendered form into `area` as a bordered, scroll-free paragraph.
pub fn render_form(frame: &mut Frame<'_>, area: Rect, view: &FormView, title: &str) {
    let width = area.width.saturating_sub(2);
    let paragraph = Paragraph::new(form_lines(view, width))
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

/// Flatten styled lines to plain text, one line per row.
pub fn plain_text(lines: &[Line<'_>]) -> String {
    lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

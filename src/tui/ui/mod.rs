//! UI module: View components for the TUI.

pub mod form;
pub mod result;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::RetentionTheme;

pub fn render_header(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![Span::styled(
            " Customer Churn Prediction",
            RetentionTheme::title(),
        )]),
        Line::from(vec![Span::styled(
            " Predict the probability that a customer will churn and identify high-risk customers for retention.",
            RetentionTheme::text_secondary(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(RetentionTheme::border());

    f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: false }), area);
}

pub fn render_caption(f: &mut Frame, area: Rect, caption: &str) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(RetentionTheme::border());

    let p = Paragraph::new(Line::from(Span::styled(
        caption.to_string(),
        RetentionTheme::text_muted(),
    )))
    .block(block)
    .wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

//! Prediction result area.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::application::AssessmentState;
use crate::domain::{Decision, RiskLevel};
use crate::tui::styles::RetentionTheme;

/// Render the result area for the current assessment state
pub fn render_result(f: &mut Frame, area: Rect, state: &AssessmentState) {
    let border_style = match state {
        AssessmentState::ResultShown(_) => RetentionTheme::border_focused(),
        AssessmentState::Idle { error: Some(_) } => RetentionTheme::danger(),
        AssessmentState::Idle { error: None } => RetentionTheme::border(),
    };

    let block = Block::default()
        .title(Span::styled(" Prediction Result ", RetentionTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    f.render_widget(block, area);

    match state {
        AssessmentState::Idle { error: None } => render_idle(f, inner),
        AssessmentState::Idle { error: Some(message) } => render_error(f, inner, message),
        AssessmentState::ResultShown(decision) => render_decision(f, inner, decision),
    }
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No prediction yet",
            RetentionTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Fill in the customer and press Enter",
            RetentionTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    f.render_widget(content, area);
}

fn render_decision(f: &mut Frame, area: Rect, decision: &Decision) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Metric
            Constraint::Length(3), // Gauge
            Constraint::Length(3), // Banner
            Constraint::Min(0),
        ])
        .margin(1)
        .split(area);

    let metric = Paragraph::new(vec![
        Line::from(Span::styled("Churn Probability", RetentionTheme::text_secondary())),
        Line::from(Span::styled(decision.percentage(), RetentionTheme::title())),
    ])
    .alignment(Alignment::Center);
    f.render_widget(metric, chunks[0]);

    let risk_style = RetentionTheme::risk_level(decision.risk_level);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(RetentionTheme::border()),
        )
        .gauge_style(risk_style)
        .percent((decision.probability * 100.0).round().clamp(0.0, 100.0) as u16)
        .label(decision.percentage());
    f.render_widget(gauge, chunks[1]);

    let icon = match decision.risk_level {
        RiskLevel::High => "!",
        RiskLevel::Low => "OK",
    };
    let banner = Paragraph::new(Line::from(Span::styled(
        format!(" {icon} {} ", decision.label()),
        RetentionTheme::banner(decision.risk_level),
    )))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(banner, chunks[2]);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Prediction failed", RetentionTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, RetentionTheme::text())),
        Line::from(""),
        Line::from(Span::styled(
            "Adjust the inputs and press Enter to try again",
            RetentionTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    f.render_widget(content, area);
}

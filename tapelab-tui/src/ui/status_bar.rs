//! Bottom status bar: key hints on the left, latest status on the right.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, StatusLevel};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = app.theme();
    let mut spans = vec![
        Span::styled(" q ", Style::default().fg(theme.accent)),
        Span::styled("quit  ", theme.muted_style()),
        Span::styled("tab ", Style::default().fg(theme.accent)),
        Span::styled("panel  ", theme.muted_style()),
        Span::styled("/ ", Style::default().fg(theme.accent)),
        Span::styled("search  ", theme.muted_style()),
        Span::styled("? ", Style::default().fg(theme.accent)),
        Span::styled("help  ", theme.muted_style()),
    ];

    if let Some((message, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme.muted_style(),
            StatusLevel::Warning => Style::default().fg(theme.warning),
            StatusLevel::Error => Style::default().fg(theme.error),
        };
        spans.push(Span::styled("│ ", theme.muted_style()));
        spans.push(Span::styled(message.clone(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

//! Modal overlays: help, symbol search, error history.

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::app::AppState;
use crate::ui::centered_rect;

pub fn render_help(f: &mut Frame, app: &AppState) {
    let theme = app.theme();
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);
    let block = Block::bordered()
        .border_style(theme.panel_border(true))
        .title(Span::styled(" Keys ", theme.title(true)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = [
        ("q", "quit"),
        ("tab / 1 2 3", "switch panel"),
        ("/", "symbol search"),
        ("e", "error history"),
        ("t", "toggle theme"),
        ("? or esc", "close this help"),
        ("", ""),
        ("[ ]", "cycle range preset"),
        ("+ / -", "zoom in / out"),
        ("h l or arrows", "pan"),
        ("r", "reset view to preset"),
        ("y", "cycle history depth"),
        ("f s v b", "toggle fast SMA / slow SMA / volume / breakouts"),
        ("wheel", "zoom at pointer"),
        ("drag", "pan the window"),
        ("", ""),
        ("j k", "move cursor in lists"),
        ("enter", "chart the selection"),
    ];
    let lines: Vec<Line> = rows
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!(" {key:<14}"), Style::default().fg(theme.accent)),
                Span::styled(*what, theme.text_style()),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

pub fn render_search(f: &mut Frame, app: &AppState) {
    let theme = app.theme();
    let area = centered_rect(50, 60, f.area());
    f.render_widget(Clear, area);
    let block = Block::bordered()
        .border_style(theme.panel_border(true))
        .title(Span::styled(" Symbol Search ", theme.title(true)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    let prompt = Line::from(vec![
        Span::styled("> ", Style::default().fg(theme.accent)),
        Span::styled(app.search.input.clone(), theme.text_style()),
        Span::styled("█", Style::default().fg(theme.accent)),
    ]);
    f.render_widget(Paragraph::new(prompt), rows[0]);

    let items: Vec<ListItem> = app
        .search
        .results
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            let line = Line::from(vec![
                Span::styled(format!(" {:<7}", hit.symbol), theme.text_style()),
                Span::styled(hit.name.clone(), theme.muted_style()),
            ]);
            let item = ListItem::new(line);
            if i == app.search.cursor {
                item.style(theme.selection())
            } else {
                item
            }
        })
        .collect();
    if items.is_empty() {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled("no matches", theme.muted_style()))),
            rows[1],
        );
    } else {
        f.render_widget(List::new(items), rows[1]);
    }
}

pub fn render_error_history(f: &mut Frame, app: &AppState) {
    let theme = app.theme();
    let area = centered_rect(70, 60, f.area());
    f.render_widget(Clear, area);
    let title = format!(" Errors ({}) ", app.error_history.len());
    let block = Block::bordered()
        .border_style(theme.panel_border(true))
        .title(Span::styled(title, theme.title(true)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.error_history.is_empty() {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "no errors this session",
                theme.muted_style(),
            )))
            .centered(),
            inner,
        );
        return;
    }

    let items: Vec<ListItem> = app
        .error_history
        .iter()
        .enumerate()
        .skip(app.error_scroll)
        .take(inner.height as usize)
        .map(|(i, record)| {
            let line = Line::from(vec![
                Span::styled(
                    record.at.format("%H:%M:%S ").to_string(),
                    theme.muted_style(),
                ),
                Span::styled(
                    format!("[{}] ", record.category.label()),
                    Style::default().fg(theme.error),
                ),
                Span::styled(format!("{}: ", record.context), theme.text_style()),
                Span::styled(record.message.clone(), theme.muted_style()),
            ]);
            let item = ListItem::new(line);
            if i == app.error_scroll {
                item.style(theme.selection())
            } else {
                item
            }
        })
        .collect();
    f.render_widget(List::new(items), inner);
}

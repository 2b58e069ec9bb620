//! Events panel: breakout events detected on the charted symbol.

use ratatui::layout::{Constraint, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use tapelab_core::scan::BreakoutDirection;

use crate::app::{AppState, Panel};
use crate::ui::panel_title;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = app.theme();
    let active = app.active_panel == Panel::Events;
    let block = Block::bordered()
        .border_style(theme.panel_border(active))
        .title(Span::styled(panel_title(Panel::Events), theme.title(active)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.chart.events.is_empty() {
        let message = if app.chart.history.is_some() {
            "no breakouts detected"
        } else {
            "load a symbol to scan"
        };
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(message, theme.muted_style()))).centered(),
            inner,
        );
        return;
    }

    // Newest events are the interesting ones; keep the cursor row on screen
    // by scrolling the slice, not the widget.
    let visible = inner.height.saturating_sub(1).max(1) as usize;
    let first = app
        .events_pane
        .cursor
        .saturating_sub(visible.saturating_sub(1));

    let header = Row::new(vec!["Date", "Dir", "Price"]).style(theme.muted_style());
    let rows: Vec<Row> = app
        .chart
        .events
        .iter()
        .enumerate()
        .skip(first)
        .take(visible)
        .map(|(i, event)| {
            let dir_style = match event.direction {
                BreakoutDirection::Bull => theme.signed(1.0),
                BreakoutDirection::Bear => theme.signed(-1.0),
            };
            let label = event
                .label
                .clone()
                .unwrap_or_else(|| event.direction.label().to_string());
            let cells = vec![
                Cell::from(event.date.format("%Y-%m-%d").to_string())
                    .style(theme.text_style()),
                Cell::from(label).style(dir_style),
                Cell::from(format!("{:.2}", event.price)).style(theme.text_style()),
            ];
            let row = Row::new(cells);
            if active && i == app.events_pane.cursor {
                row.style(theme.selection())
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .column_spacing(1);
    f.render_widget(table, inner);
}

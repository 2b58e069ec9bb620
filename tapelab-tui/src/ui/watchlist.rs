//! Watchlist panel: every universe symbol with its latest quote.

use ratatui::layout::{Constraint, Rect};
use ratatui::text::Span;
use ratatui::widgets::{Block, Cell, Row, Table};
use ratatui::Frame;

use crate::app::{AppState, Panel};
use crate::ui::panel_title;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = app.theme();
    let active = app.active_panel == Panel::Watchlist;
    let block = Block::bordered()
        .border_style(theme.panel_border(active))
        .title(Span::styled(
            panel_title(Panel::Watchlist),
            theme.title(active),
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let header = Row::new(vec!["Sym", "Last", "Chg%"]).style(theme.muted_style());
    let rows: Vec<Row> = app
        .watchlist
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let (last, chg, style) = match &row.quote {
                Some(q) => (
                    format!("{:.2}", q.price),
                    format!("{:+.2}%", q.change_pct),
                    theme.signed(q.change),
                ),
                None => ("--".to_string(), "--".to_string(), theme.muted_style()),
            };
            let marker = if row.symbol == app.chart.symbol {
                "▸"
            } else {
                " "
            };
            let cells = vec![
                Cell::from(format!("{marker}{}", row.symbol)).style(theme.text_style()),
                Cell::from(last).style(theme.text_style()),
                Cell::from(chg).style(style),
            ];
            let row = Row::new(cells);
            if active && i == app.watchlist.cursor {
                row.style(theme.selection())
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Length(9),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .column_spacing(1);
    f.render_widget(table, inner);
}

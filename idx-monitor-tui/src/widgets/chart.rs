//! Price history chart of the selected ticker.

use idx_monitor::{DashboardSnapshot, PanelState, StockDetail};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Chart, Dataset, GraphType, Paragraph},
};

use super::{C_ACCENT, C_BRIGHT, C_DIM, C_DOWN, change_color, panel, render_message, stale_notice};
use crate::format::{format_change, format_idr};

pub fn render_chart_panel(f: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
    let ticker = snapshot.view.selected_ticker.as_deref();
    let block = panel(" PRICE HISTORY ", C_ACCENT);

    let ready = match (&snapshot.detail, ticker) {
        (_, None) | (PanelState::Idle, _) => {
            let lines = vec![
                Line::from(Span::styled(
                    "Select a Stock",
                    Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "Move to a ticker and press Enter to view its performance.",
                    Style::default().fg(C_DIM),
                )),
            ];
            render_message(f, area, block, lines);
            return;
        }
        (PanelState::Loading, Some(ticker)) => {
            let line = Line::from(Span::styled(
                format!("Loading data for {ticker}..."),
                Style::default().fg(C_ACCENT),
            ));
            render_message(f, area, block, vec![line]);
            return;
        }
        (PanelState::Failed(error), Some(ticker)) => {
            let lines = vec![
                Line::from(Span::styled(
                    format!("Error loading data for {ticker}"),
                    Style::default().fg(C_DOWN).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(error.to_string(), Style::default().fg(C_DIM))),
            ];
            render_message(f, area, block, lines);
            return;
        }
        (PanelState::Empty { .. }, Some(ticker)) => {
            let line = Line::from(Span::styled(
                format!("No history for {ticker}"),
                Style::default().fg(C_DIM),
            ));
            render_message(f, area, block, vec![line]);
            return;
        }
        (PanelState::Ready(ready), Some(_)) => ready,
    };

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(4), Constraint::Length(1)])
        .split(inner);

    render_quote_header(f, chunks[0], &ready.data);
    render_history(f, chunks[1], &ready.data);

    let footer = match (&ready.stale_error, ready.last_fetched_at) {
        (Some(error), _) => stale_notice(error),
        (None, Some(at)) => Line::from(Span::styled(
            format!("Last updated: {}", at.format("%H:%M:%S UTC")),
            Style::default().fg(C_DIM),
        )),
        (None, None) => Line::default(),
    };
    f.render_widget(Paragraph::new(footer), chunks[2]);
}

fn render_quote_header(f: &mut Frame, area: Rect, detail: &StockDetail) {
    let color = change_color(detail.is_up());
    let lines = vec![
        Line::from(vec![
            Span::styled(
                detail.ticker.clone(),
                Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format_idr(detail.last_price),
                Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(format_change(detail.change_percent), Style::default().fg(color)),
        ]),
        Line::from(Span::styled(detail.name.clone(), Style::default().fg(C_DIM))),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_history(f: &mut Frame, area: Rect, detail: &StockDetail) {
    let Some((low, high)) = detail.price_range() else {
        let line = Line::from(Span::styled("No history available", Style::default().fg(C_DIM)));
        render_message(f, area, Block::default(), vec![line]);
        return;
    };

    let points: Vec<(f64, f64)> = detail
        .history
        .iter()
        .enumerate()
        .map(|(index, point)| (index as f64, point.price))
        .collect();

    let (y_min, y_max) = padded_bounds(low, high);
    let x_max = points.len().saturating_sub(1).max(1) as f64;

    let x_labels: Vec<String> = match (detail.history.first(), detail.history.last()) {
        (Some(first), Some(last)) => vec![
            first.date.format("%d %b").to_string(),
            last.date.format("%d %b").to_string(),
        ],
        _ => Vec::new(),
    };

    let dataset = Dataset::default()
        .name("Price")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(change_color(detail.is_up())))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .style(Style::default().fg(C_DIM))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(C_DIM))
                .bounds([y_min, y_max])
                .labels([format!("{low:.0}"), format!("{high:.0}")]),
        )
        .legend_position(None);

    f.render_widget(chart, area);
}

/// Y-axis bounds with a little headroom, never collapsing to a zero-height range.
fn padded_bounds(low: f64, high: f64) -> (f64, f64) {
    let pad = ((high - low) * 0.05).max(high.abs() * 0.001).max(1.0);
    (low - pad, high + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_bounds() {
        let (low, high) = padded_bounds(9_000.0, 9_200.0);
        assert!((low - 8_990.0).abs() < 1e-9);
        assert!((high - 9_210.0).abs() < 1e-9);

        let (low, high) = padded_bounds(70.0, 70.0);
        assert!(low < 70.0 && high > 70.0);
    }
}

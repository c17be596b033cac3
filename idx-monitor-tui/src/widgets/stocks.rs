//! Stock table with search line and pagination footer.

use idx_monitor::{DashboardSnapshot, PanelState};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Cell, Paragraph, Row, Table, TableState},
};

use super::{C_ACCENT, C_BRIGHT, C_DIM, C_DOWN, C_WARN, change_color, panel, render_message, stale_notice};
use crate::{
    app::{App, InputMode},
    format::{format_change, format_idr},
};

const C_ROW_HIGHLIGHT: Color = Color::Rgb(40, 50, 60);

pub fn render_stock_panel(f: &mut Frame, area: Rect, snapshot: &DashboardSnapshot, app: &App) {
    let block = panel(" MARKET DATA ", C_ACCENT);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    render_search_line(f, chunks[0], snapshot, app);
    render_rows(f, chunks[1], snapshot, app);
    render_pager(f, chunks[2], snapshot);
}

fn render_search_line(f: &mut Frame, area: Rect, snapshot: &DashboardSnapshot, app: &App) {
    let (term, style) = match app.mode {
        InputMode::Search => (
            format!("{}▏", app.search_input),
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
        ),
        InputMode::Normal if snapshot.view.search.is_empty() => {
            ("ticker or name (/)".to_string(), Style::default().fg(C_DIM))
        }
        InputMode::Normal => (snapshot.view.search.clone(), Style::default().fg(C_BRIGHT)),
    };

    let line = Line::from(vec![
        Span::styled("🔍 ", Style::default().fg(C_DIM)),
        Span::styled(term, style),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_rows(f: &mut Frame, area: Rect, snapshot: &DashboardSnapshot, app: &App) {
    let ready = match &snapshot.stocks {
        PanelState::Ready(ready) => ready,
        PanelState::Idle | PanelState::Loading => {
            let line = Line::from(Span::styled("Loading stocks...", Style::default().fg(C_ACCENT)));
            render_message(f, area, Block::default(), vec![line]);
            return;
        }
        PanelState::Failed(error) => {
            let lines = vec![
                Line::from(Span::styled(
                    "Failed to load stocks",
                    Style::default().fg(C_DOWN).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(error.to_string(), Style::default().fg(C_DIM))),
            ];
            render_message(f, area, Block::default(), lines);
            return;
        }
        PanelState::Empty { stale_error } => {
            let mut lines = vec![Line::from(Span::styled(
                "No stocks found.",
                Style::default().fg(C_DIM),
            ))];
            lines.extend(stale_error.as_ref().map(stale_notice));
            render_message(f, area, Block::default(), lines);
            return;
        }
    };

    let selected = snapshot.view.selected_ticker.as_deref();
    let header = Row::new(["Ticker", "Name", "Price", "Change"].map(|title| {
        Cell::from(title).style(Style::default().fg(C_DIM).add_modifier(Modifier::BOLD))
    }));

    // Placeholder rows belong to the previous page and are dimmed until the new page lands
    let row_style = if ready.placeholder {
        Style::default().fg(C_DIM)
    } else {
        Style::default().fg(C_BRIGHT)
    };

    let rows = ready.data.data.iter().map(|stock| {
        let marker = if selected == Some(stock.ticker.as_str()) { "▌" } else { " " };
        Row::new(vec![
            Cell::from(Line::from(vec![
                Span::styled(marker, Style::default().fg(C_ACCENT)),
                Span::styled(stock.ticker.clone(), row_style.add_modifier(Modifier::BOLD)),
            ])),
            Cell::from(stock.name.clone()).style(Style::default().fg(C_DIM)),
            Cell::from(format_idr(stock.last_price)).style(row_style),
            Cell::from(format_change(stock.change_percent))
                .style(Style::default().fg(change_color(stock.is_up()))),
        ])
    });

    let widths = [
        Constraint::Length(8),
        Constraint::Min(12),
        Constraint::Length(16),
        Constraint::Length(10),
    ];

    let mut body = area;
    if let Some(error) = &ready.stale_error {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        f.render_widget(Paragraph::new(stale_notice(error)), split[1]);
        body = split[0];
    }

    let table = Table::new(rows, widths)
        .header(header)
        .row_highlight_style(Style::default().bg(C_ROW_HIGHLIGHT));

    let mut state = TableState::default().with_selected(Some(app.cursor));
    f.render_stateful_widget(table, body, &mut state);
}

fn render_pager(f: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
    let arrow_style = |enabled: bool| {
        if enabled {
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_DIM)
        }
    };

    let mut spans = vec![
        Span::styled("◀ ", arrow_style(snapshot.has_prev)),
        Span::styled(
            format!("Page {} of {}", snapshot.view.page, snapshot.total_pages),
            Style::default().fg(C_DIM),
        ),
        Span::styled(" ▶", arrow_style(snapshot.has_next)),
    ];
    if let PanelState::Ready(ready) = &snapshot.stocks {
        if ready.refreshing {
            spans.push(Span::styled("  ⟳", Style::default().fg(C_WARN)));
        }
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

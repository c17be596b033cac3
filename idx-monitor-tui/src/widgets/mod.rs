//! Ratatui widgets for the monitor panels.

pub mod chart;
pub mod stocks;
pub mod whales;

use chrono::{DateTime, Utc};
use idx_monitor::{ActiveView, DashboardSnapshot, FetchError};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
};

use crate::app::{App, InputMode};

pub const C_UP: Color = Color::Rgb(100, 220, 100);
pub const C_DOWN: Color = Color::Rgb(220, 100, 100);
pub const C_WARN: Color = Color::Rgb(230, 200, 80);
pub const C_DIM: Color = Color::Rgb(120, 120, 120);
pub const C_BRIGHT: Color = Color::Rgb(220, 220, 220);
pub const C_ACCENT: Color = Color::Rgb(100, 180, 220);

pub fn change_color(up: bool) -> Color {
    if up { C_UP } else { C_DOWN }
}

/// Bordered panel block with a title.
pub fn panel(title: &str, border: Color) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

/// Centered message inside a panel (loading, empty, failure).
pub fn render_message(f: &mut Frame, area: Rect, block: Block, lines: Vec<Line>) {
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(paragraph, area);
}

/// One-line notice for a failed background refresh.
pub fn stale_notice(error: &FetchError) -> Line<'static> {
    Line::from(Span::styled(
        format!("⚠ refresh failed, showing last data ({})", error.kind()),
        Style::default().fg(C_WARN),
    ))
}

pub fn render_header(f: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
    let selected = match snapshot.view.active_view {
        ActiveView::Dashboard => 0,
        ActiveView::Whales => 1,
    };
    let titles = [ActiveView::Dashboard, ActiveView::Whales]
        .iter()
        .enumerate()
        .map(|(index, view)| Line::from(format!(" {} {} ", index + 1, view)));

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(C_DIM))
        .highlight_style(
            Style::default()
                .fg(C_ACCENT)
                .add_modifier(Modifier::BOLD),
        )
        .block(panel(" IDX MONITOR ", C_ACCENT));

    f.render_widget(tabs, area);
}

pub fn render_status(f: &mut Frame, area: Rect, app: &App, last_update: Option<DateTime<Utc>>) {
    let mut spans = match app.mode {
        InputMode::Search => vec![
            Span::styled(" SEARCH ", Style::default().fg(Color::Black).bg(C_ACCENT)),
            Span::styled(
                " type to filter · Enter/Esc done ",
                Style::default().fg(C_DIM),
            ),
        ],
        InputMode::Normal => vec![Span::styled(
            " Tab/1/2 view · ↑↓ move · Enter select · ←→ page · / search · r refresh · q quit ",
            Style::default().fg(C_DIM),
        )],
    };

    let live = match last_update {
        Some(at) => format!(" ● live · updated {} ", at.format("%H:%M:%S")),
        None => " ○ waiting for data ".to_string(),
    };
    spans.push(Span::styled(live, Style::default().fg(C_UP)));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

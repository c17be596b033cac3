//! Whale alert cards.

use idx_monitor::{Badge, ClassifiedAlert, DashboardSnapshot, PanelState, Severity};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph},
};

use super::{C_ACCENT, C_BRIGHT, C_DIM, C_DOWN, C_UP, C_WARN, change_color, panel, render_message, stale_notice};
use crate::format::{format_change, format_idr, format_millions, format_ratio};

const CARD_HEIGHT: u16 = 7;
const CARD_MIN_WIDTH: u16 = 36;

pub fn render_whale_panel(f: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
    let block = panel(" WHALE ALERTS · unusual volume ", C_ACCENT);

    let ready = match &snapshot.alerts {
        PanelState::Ready(ready) => ready,
        PanelState::Idle | PanelState::Loading => {
            let line = Line::from(Span::styled("Scanning for whales...", Style::default().fg(C_ACCENT)));
            render_message(f, area, block, vec![line]);
            return;
        }
        PanelState::Failed(error) => {
            let lines = vec![
                Line::from(Span::styled(
                    "Failed to load whale alerts.",
                    Style::default().fg(C_DOWN).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(error.to_string(), Style::default().fg(C_DIM))),
            ];
            render_message(f, area, block, lines);
            return;
        }
        PanelState::Empty { stale_error } => {
            let mut lines = vec![
                Line::from(Span::styled(
                    "No Unusual Activity Detected",
                    Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "Market is currently behaving within normal volume parameters.",
                    Style::default().fg(C_DIM),
                )),
            ];
            lines.extend(stale_error.as_ref().map(stale_notice));
            render_message(f, area, block, lines);
            return;
        }
    };

    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut body = inner;
    if let Some(error) = &ready.stale_error {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(inner);
        f.render_widget(Paragraph::new(stale_notice(error)), split[0]);
        body = split[1];
    }

    let columns = (body.width / CARD_MIN_WIDTH).max(1) as usize;
    for (area, alert) in card_areas(body, columns, ready.data.len()).into_iter().zip(&ready.data) {
        render_card(f, area, alert);
    }
}

/// Grid cells for `count` cards, dropping the rows that do not fit.
fn card_areas(area: Rect, columns: usize, count: usize) -> Vec<Rect> {
    let visible_rows = (area.height / CARD_HEIGHT) as usize;
    let rows = count.div_ceil(columns).min(visible_rows);

    let mut cells = Vec::with_capacity(rows * columns);
    for row in 0..rows {
        let row_area = Rect {
            y: area.y + (row as u16) * CARD_HEIGHT,
            height: CARD_HEIGHT,
            ..area
        };
        let constraints = vec![Constraint::Ratio(1, columns as u32); columns];
        let row_cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(row_area);
        cells.extend(row_cells.iter().copied());
    }
    cells.truncate(count);
    cells
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Elevated => C_WARN,
        Severity::Normal => C_UP,
    }
}

fn render_card(f: &mut Frame, area: Rect, item: &ClassifiedAlert) {
    let ClassifiedAlert { alert, class } = item;
    let badge_color = match class.badge {
        Badge::Whale => C_WARN,
        Badge::Standard => C_UP,
    };
    let ratio_color = severity_color(class.severity);

    let block = panel("", badge_color);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let price = alert.price.map_or_else(|| "--".to_string(), format_idr);
    let title = vec![
        Line::from(vec![
            Span::styled(
                alert.ticker.clone(),
                Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(price, Style::default().fg(C_BRIGHT)),
            Span::raw("  "),
            Span::styled(
                format_change(alert.change_percent),
                Style::default().fg(change_color(alert.is_up())),
            ),
        ]),
        Line::from(Span::styled(alert.name.clone(), Style::default().fg(C_DIM))),
    ];
    f.render_widget(Paragraph::new(title), chunks[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(ratio_color).bg(Color::Rgb(50, 55, 65)))
        .label(Span::styled(
            format_ratio(alert.volume_ratio),
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
        ))
        .ratio((class.bar_fill_percent / 100.0).clamp(0.0, 1.0));
    f.render_widget(gauge, chunks[1]);

    let volume = Line::from(vec![
        Span::styled(format!("Vol: {}", format_millions(alert.volume)), Style::default().fg(C_DIM)),
        Span::raw("   "),
        Span::styled(
            format!("Avg: {}", format_millions(alert.avg_volume)),
            Style::default().fg(C_DIM),
        ),
    ]);
    f.render_widget(Paragraph::new(volume), chunks[2]);

    let badge = Line::from(Span::styled(
        format!(" {} ", alert.signal.to_uppercase()),
        Style::default()
            .fg(Color::Black)
            .bg(badge_color)
            .add_modifier(Modifier::BOLD),
    ));
    f.render_widget(Paragraph::new(badge), chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_areas() {
        struct TestCase {
            area: Rect,
            columns: usize,
            count: usize,
            expected: usize,
        }

        let tests = vec![
            TestCase {
                // TC0: fewer cards than one row
                area: Rect::new(0, 0, 120, 30),
                columns: 3,
                count: 2,
                expected: 2,
            },
            TestCase {
                // TC1: two full rows plus one
                area: Rect::new(0, 0, 120, 30),
                columns: 3,
                count: 7,
                expected: 7,
            },
            TestCase {
                // TC2: only two rows fit
                area: Rect::new(0, 0, 120, 14),
                columns: 3,
                count: 9,
                expected: 6,
            },
            TestCase {
                // TC3: too short for a single card
                area: Rect::new(0, 0, 120, 5),
                columns: 3,
                count: 4,
                expected: 0,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = card_areas(test.area, test.columns, test.count);
            assert_eq!(actual.len(), test.expected, "TC{} failed", index);
            assert!(
                actual.iter().all(|cell| cell.height == CARD_HEIGHT),
                "TC{} failed",
                index
            );
        }
    }
}

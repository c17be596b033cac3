/// IDX Market Monitor
///
/// Dashboard view: paginated, searchable stock table next to the selected ticker's price
/// history. Whales view: unusual volume alerts. Data is polled from the IDX API service
/// (`IDX_API_URL`, default http://localhost:8000/api) and only for the view on screen.
use std::{error::Error, fs::OpenOptions, io, sync::Arc, sync::Mutex, time::Duration};

use chrono::{DateTime, Utc};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use idx_monitor::{ActiveView, Dashboard, DashboardSnapshot, HttpGateway, MonitorConfig, PanelState};
use idx_monitor_tui::{
    App,
    widgets::{chart, render_header, render_status, stocks, whales},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
};
use tracing::{error, info};

/// Get the log file path from IDX_LOG_FILE env var (default: idx-monitor.log)
fn get_log_file() -> String {
    std::env::var("IDX_LOG_FILE").unwrap_or_else(|_| "idx-monitor.log".to_string())
}

/// Get the redraw interval from IDX_TICK_MS env var (default: 250ms)
fn get_tick_rate() -> Duration {
    let millis = std::env::var("IDX_TICK_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or(250);
    Duration::from_millis(millis)
}

/// Log to a file so output never lands on the terminal being drawn.
fn init_logging() -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(get_log_file())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging()?;

    let config = MonitorConfig::from_env()?;
    let gateway = Arc::new(HttpGateway::new(&config)?);
    info!(api_url = %config.api_url, "starting idx monitor");

    // Setup panic hook to restore terminal on crash
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut dashboard = Dashboard::new(&config, gateway);
    let result = run(&mut terminal, &mut dashboard, get_tick_rate());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!(%err, "monitor stopped");
    } else {
        info!("monitor stopped");
    }
    result
}

fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    dashboard: &mut Dashboard,
    tick_rate: Duration,
) -> Result<(), Box<dyn Error>> {
    let mut app = App::new();

    while !app.should_quit {
        let snapshot = dashboard.snapshot();
        let rows = snapshot.stocks.data().map_or(0, |page| page.data.len());
        app.clamp_cursor(rows);

        terminal.draw(|f| render_ui(f, &snapshot, &app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if let Some(action) = app.on_key(key) {
                    app.apply(action, dashboard, &snapshot);
                }
            }
        }
    }
    Ok(())
}

fn render_ui(f: &mut Frame, snapshot: &DashboardSnapshot, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, chunks[0], snapshot);

    match snapshot.view.active_view {
        ActiveView::Dashboard => {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                .split(chunks[1]);
            stocks::render_stock_panel(f, body[0], snapshot, app);
            chart::render_chart_panel(f, body[1], snapshot);
        }
        ActiveView::Whales => whales::render_whale_panel(f, chunks[1], snapshot),
    }

    render_status(f, chunks[2], app, latest_update(snapshot));
}

/// Most recent successful fetch among the panels on screen.
fn latest_update(snapshot: &DashboardSnapshot) -> Option<DateTime<Utc>> {
    fn fetched_at<T>(panel: &PanelState<T>) -> Option<DateTime<Utc>> {
        match panel {
            PanelState::Ready(ready) => ready.last_fetched_at,
            _ => None,
        }
    }

    match snapshot.view.active_view {
        ActiveView::Dashboard => fetched_at(&snapshot.stocks).max(fetched_at(&snapshot.detail)),
        ActiveView::Whales => fetched_at(&snapshot.alerts),
    }
}

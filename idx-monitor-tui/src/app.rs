//! Keyboard handling and cursor state for the terminal UI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use idx_monitor::{ActiveView, Dashboard, DashboardSnapshot, PanelState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Keystrokes edit the search term.
    Search,
}

/// User intent decoded from a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleView,
    ShowView(ActiveView),
    CursorUp,
    CursorDown,
    Select,
    NextPage,
    PrevPage,
    Search(String),
    Refresh,
}

#[derive(Debug, Default)]
pub struct App {
    pub mode: InputMode,
    /// Highlighted row of the stock table.
    pub cursor: usize,
    pub search_input: String,
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        match self.mode {
            InputMode::Normal => self.on_normal_key(key.code),
            InputMode::Search => self.on_search_key(key.code),
        }
    }

    fn on_normal_key(&mut self, code: KeyCode) -> Option<Action> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Tab => Some(Action::ToggleView),
            KeyCode::Char('1') => Some(Action::ShowView(ActiveView::Dashboard)),
            KeyCode::Char('2') => Some(Action::ShowView(ActiveView::Whales)),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::CursorUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::CursorDown),
            KeyCode::Enter => Some(Action::Select),
            KeyCode::Left | KeyCode::Char('h') => Some(Action::PrevPage),
            KeyCode::Right | KeyCode::Char('l') => Some(Action::NextPage),
            KeyCode::Char('r') => Some(Action::Refresh),
            KeyCode::Char('/') => {
                self.mode = InputMode::Search;
                None
            }
            _ => None,
        }
    }

    fn on_search_key(&mut self, code: KeyCode) -> Option<Action> {
        match code {
            KeyCode::Char(c) => {
                self.search_input.push(c);
                Some(Action::Search(self.search_input.clone()))
            }
            KeyCode::Backspace => self
                .search_input
                .pop()
                .map(|_| Action::Search(self.search_input.clone())),
            KeyCode::Enter | KeyCode::Esc => {
                self.mode = InputMode::Normal;
                None
            }
            _ => None,
        }
    }

    /// Apply an action against the dashboard. Row actions use the stock rows of `snapshot`.
    pub fn apply(&mut self, action: Action, dashboard: &mut Dashboard, snapshot: &DashboardSnapshot) {
        let rows = snapshot.stocks.data().map_or(&[][..], |page| page.data.as_slice());
        let on_dashboard = snapshot.view.active_view == ActiveView::Dashboard;

        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleView => dashboard.switch_view(snapshot.view.active_view.toggle()),
            Action::ShowView(view) => dashboard.switch_view(view),
            Action::Refresh => dashboard.refresh_visible(),
            _ if !on_dashboard => {}
            Action::CursorUp => self.cursor = self.cursor.saturating_sub(1),
            Action::CursorDown => {
                self.cursor += 1;
                self.clamp_cursor(rows.len());
            }
            Action::Select => {
                if let Some(ticker) = self.selectable_ticker(snapshot) {
                    dashboard.select_ticker(ticker.to_string());
                }
            }
            Action::NextPage => {
                if dashboard.next_page() {
                    self.cursor = 0;
                }
            }
            Action::PrevPage => {
                if dashboard.prev_page() {
                    self.cursor = 0;
                }
            }
            Action::Search(term) => {
                dashboard.set_search(term);
                self.cursor = 0;
            }
        }
    }

    /// Ticker under the cursor, if the table shows rows of the current page.
    pub fn selectable_ticker<'a>(&self, snapshot: &'a DashboardSnapshot) -> Option<&'a str> {
        match &snapshot.stocks {
            // Placeholder rows belong to the previous page
            PanelState::Ready(ready) if !ready.placeholder => ready
                .data
                .data
                .get(self.cursor)
                .map(|row| row.ticker.as_str()),
            _ => None,
        }
    }

    /// Keep the cursor inside a table of `rows` rows.
    pub fn clamp_cursor(&mut self, rows: usize) {
        self.cursor = self.cursor.min(rows.saturating_sub(1));
    }
}

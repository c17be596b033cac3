/// IDX Monitor TUI - Shared Library
///
/// Terminal front end for the `idx-monitor` binary:
/// - Key handling and row cursor state
/// - Rupiah and volume formatting
/// - Ratatui widgets for the stock table, price chart and whale alert cards
pub mod app;
pub mod format;
pub mod widgets;

pub use app::{Action, App, InputMode};
pub use format::{format_change, format_idr, format_millions, format_ratio};

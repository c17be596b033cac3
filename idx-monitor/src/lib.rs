/// IDX Monitor - Data Synchronization Core
///
/// Client-side layer behind the IDX market monitor. It polls a remote data service for
/// paginated stock quotes, per-ticker price history and whale (unusual volume) alerts, and
/// keeps the three views consistent:
/// - Remote data gateway with typed, validated responses
/// - Per-key query cache with de-duplication, background refresh and stale-response discard
/// - Pagination/search controller and view activation gate
/// - Whale signal classifier for alert presentation
///
/// The render layer consumes [`DashboardSnapshot`] values produced by [`Dashboard`].
pub mod cache;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod query;
pub mod signal;
pub mod types;

// Re-export commonly used types for convenience
pub use cache::{CacheEntry, Fetcher, QueryCache, QueryStatus, Subscription, fetcher_fn};
pub use config::{MonitorConfig, RefreshCadence};
pub use controller::{ActiveView, ViewController, ViewState};
pub use dashboard::{ClassifiedAlert, Dashboard, DashboardSnapshot, PanelData, PanelState};
pub use error::{ConfigError, FetchError, FetchErrorKind};
pub use gate::ViewGate;
pub use gateway::{HttpGateway, MarketGateway, StocksQuery};
pub use query::{QueryKey, QueryPolicy};
pub use signal::{Badge, Severity, SignalClass, SignalTier, classify};
pub use types::{HistoryPoint, StockDetail, StockPage, StockSummary, WhaleAlert};

//! Dashboard orchestration.
//!
//! Wires the [`ViewController`], [`ViewGate`] and the three [`QueryCache`]s to a
//! [`MarketGateway`]. Each controller transition re-derives the active query keys, swaps
//! subscriptions when a key changes and re-applies the gate. The render layer reads a
//! [`DashboardSnapshot`] and never touches the caches directly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    cache::{CacheEntry, Fetcher, QueryCache, QueryStatus, Subscription, fetcher_fn},
    config::{MonitorConfig, RefreshCadence},
    controller::{ActiveView, ViewController, ViewState},
    error::FetchError,
    gate::ViewGate,
    gateway::{MarketGateway, StocksQuery},
    query::{QueryKey, QueryPolicy},
    signal::{SignalClass, classify},
    types::{StockDetail, StockPage, WhaleAlert},
};

/// What a panel should show, resolved from its cache entry.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState<T> {
    /// Query not active (e.g. no ticker selected).
    Idle,
    /// First load, nothing to show yet.
    Loading,
    /// No data has ever been obtained and the last attempt failed.
    Failed(FetchError),
    /// Valid zero-row result.
    Empty { stale_error: Option<FetchError> },
    Ready(PanelData<T>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelData<T> {
    pub data: T,
    /// Set when the latest refresh failed and `data` is the last good value.
    pub stale_error: Option<FetchError>,
    /// A background refresh is in flight.
    pub refreshing: bool,
    /// `data` belongs to a previously shown key (kept while the new key loads).
    pub placeholder: bool,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl<T> PanelState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            PanelState::Ready(ready) => Some(&ready.data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PanelState::Loading)
    }

    fn map<U>(self, f: impl FnOnce(T) -> U) -> PanelState<U> {
        match self {
            PanelState::Idle => PanelState::Idle,
            PanelState::Loading => PanelState::Loading,
            PanelState::Failed(error) => PanelState::Failed(error),
            PanelState::Empty { stale_error } => PanelState::Empty { stale_error },
            PanelState::Ready(ready) => PanelState::Ready(PanelData {
                data: f(ready.data),
                stale_error: ready.stale_error,
                refreshing: ready.refreshing,
                placeholder: ready.placeholder,
                last_fetched_at: ready.last_fetched_at,
            }),
        }
    }
}

/// Resolve a cache entry into a [`PanelState`].
///
/// Last good data always wins over an error; an empty result is only reported as
/// [`PanelState::Empty`] when it came from a successful fetch, never for a failure.
pub fn resolve_panel<T>(
    entry: CacheEntry<T>,
    placeholder: Option<T>,
    is_empty: impl Fn(&T) -> bool,
) -> PanelState<T> {
    let stale_error = match entry.status {
        QueryStatus::Error => entry.error.clone(),
        _ => None,
    };

    match entry.data {
        Some(data) if is_empty(&data) => PanelState::Empty { stale_error },
        Some(data) => PanelState::Ready(PanelData {
            data,
            stale_error,
            refreshing: entry.is_fetching,
            placeholder: false,
            last_fetched_at: entry.last_fetched_at,
        }),
        None => match (entry.status, entry.error) {
            (QueryStatus::Error, Some(error)) => PanelState::Failed(error),
            (QueryStatus::Idle, _) => PanelState::Idle,
            _ => match placeholder {
                Some(data) => PanelState::Ready(PanelData {
                    data,
                    stale_error: None,
                    refreshing: true,
                    placeholder: true,
                    last_fetched_at: None,
                }),
                None => PanelState::Loading,
            },
        },
    }
}

/// Whale alert with its presentation classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedAlert {
    pub alert: WhaleAlert,
    pub class: SignalClass,
}

/// Everything the render layer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub view: ViewState,
    pub total_pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
    pub stocks: PanelState<StockPage>,
    pub detail: PanelState<StockDetail>,
    pub alerts: PanelState<Vec<ClassifiedAlert>>,
}

pub struct Dashboard {
    gateway: Arc<dyn MarketGateway>,
    cadence: RefreshCadence,
    controller: ViewController,
    gate: ViewGate,
    stocks: QueryCache<StockPage>,
    details: QueryCache<StockDetail>,
    alerts: QueryCache<Vec<WhaleAlert>>,
    list_sub: Subscription<StockPage>,
    detail_sub: Option<Subscription<StockDetail>>,
    alerts_sub: Subscription<Vec<WhaleAlert>>,
    last_list: Option<StockPage>,
    alerts_seen_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("view", self.controller.state())
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Build the dashboard and subscribe to the initial queries.
    ///
    /// Must be called inside a tokio runtime: initial fetches are spawned immediately.
    pub fn new(config: &MonitorConfig, gateway: Arc<dyn MarketGateway>) -> Self {
        let controller = ViewController::new(config.page_size, config.default_ticker.clone());
        let gate = ViewGate::for_state(controller.state());
        let cadence = config.cadence;

        let stocks = QueryCache::new("stocks");
        let details = QueryCache::new("stock-detail");
        let alerts = QueryCache::new("whale-alerts");

        let list_sub = stocks.get_or_fetch(
            controller.list_key(),
            list_fetcher(&gateway, &controller),
            QueryPolicy::polling(cadence.stocks).with_enabled(gate.list),
        );
        let detail_sub = controller.state().selected_ticker.as_ref().map(|ticker| {
            details.get_or_fetch(
                QueryKey::stock_detail(ticker.clone()),
                detail_fetcher(&gateway, ticker),
                QueryPolicy::polling(cadence.detail).with_enabled(gate.detail),
            )
        });
        let alerts_sub = alerts.get_or_fetch(
            controller.alerts_key(),
            alerts_fetcher(&gateway),
            QueryPolicy::polling(cadence.alerts).with_enabled(gate.alerts),
        );

        info!(
            page_size = controller.page_size(),
            ticker = ?controller.state().selected_ticker,
            "dashboard started"
        );

        Self {
            gateway,
            cadence,
            controller,
            gate,
            stocks,
            details,
            alerts,
            list_sub,
            detail_sub,
            alerts_sub,
            last_list: None,
            alerts_seen_at: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        self.controller.state()
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.controller.set_search(term);
        debug!(search = %self.controller.state().search, "search changed");
        self.sync();
    }

    pub fn set_page(&mut self, n: u32) -> bool {
        self.observe();
        let moved = self.controller.set_page(n);
        if moved {
            self.sync();
        }
        moved
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.controller.page().saturating_add(1))
    }

    pub fn prev_page(&mut self) -> bool {
        self.set_page(self.controller.page().saturating_sub(1))
    }

    pub fn select_ticker(&mut self, ticker: impl Into<String>) {
        self.controller.select_ticker(ticker);
        debug!(ticker = ?self.controller.state().selected_ticker, "ticker selected");
        self.sync();
    }

    pub fn switch_view(&mut self, view: ActiveView) {
        if self.controller.state().active_view == view {
            return;
        }
        self.controller.switch_view(view);
        info!(%view, "view switched");
        self.sync();
    }

    /// Force a refetch of the queries the current view is polling.
    pub fn refresh_visible(&self) {
        if self.gate.list {
            self.stocks.refetch(self.list_sub.key());
        }
        if self.gate.detail {
            if let Some(sub) = &self.detail_sub {
                self.details.refetch(sub.key());
            }
        }
        if self.gate.alerts {
            self.alerts.refetch(self.alerts_sub.key());
        }
    }

    /// Resolve the current state of every panel.
    pub fn snapshot(&mut self) -> DashboardSnapshot {
        self.observe();

        let list_entry = self.list_sub.current();
        let stocks = resolve_panel(list_entry, self.last_list.clone(), StockPage::is_empty);

        let detail = match &self.detail_sub {
            Some(sub) => resolve_panel(sub.current(), None, |_| false),
            None => PanelState::Idle,
        };

        let alerts = resolve_panel(self.alerts_sub.current(), None, Vec::is_empty).map(|alerts| {
            alerts
                .into_iter()
                .map(|alert| ClassifiedAlert {
                    class: classify(&alert),
                    alert,
                })
                .collect()
        });

        DashboardSnapshot {
            view: self.controller.state().clone(),
            total_pages: self.controller.total_pages(),
            has_prev: self.controller.has_prev(),
            has_next: self.controller.has_next(),
            stocks,
            detail,
            alerts,
        }
    }

    /// Fold the latest fetch results into the paging bound and placeholder.
    fn observe(&mut self) {
        let entry = self.list_sub.current();
        if let Some(page) = entry.data {
            let before = self.controller.page();
            self.controller.set_total_pages(page.total_pages);
            self.last_list = Some(page);
            if self.controller.page() != before {
                debug!(
                    page = self.controller.page(),
                    total_pages = self.controller.total_pages(),
                    "page clamped to new bound"
                );
                self.sync();
            }
        }

        let alerts = self.alerts_sub.current();
        if alerts.last_fetched_at.is_some() && alerts.last_fetched_at != self.alerts_seen_at {
            self.alerts_seen_at = alerts.last_fetched_at;
            for alert in alerts.data.iter().flatten() {
                let class = classify(alert);
                if class.is_inconsistent() {
                    debug!(
                        ticker = %alert.ticker,
                        signal = %alert.signal,
                        ratio = ?alert.volume_ratio,
                        "whale label and volume ratio disagree"
                    );
                }
            }
        }
    }

    /// Re-derive keys and gate after a transition.
    fn sync(&mut self) {
        let gate = ViewGate::for_state(self.controller.state());

        let list_key = self.controller.list_key();
        if *self.list_sub.key() != list_key {
            debug!(key = %list_key, "list key changed");
            self.list_sub = self.stocks.get_or_fetch(
                list_key,
                list_fetcher(&self.gateway, &self.controller),
                QueryPolicy::polling(self.cadence.stocks).with_enabled(gate.list),
            );
        } else {
            self.stocks.set_enabled(&list_key, gate.list);
        }

        match self.controller.state().selected_ticker.clone() {
            Some(ticker) => {
                let detail_key = QueryKey::stock_detail(ticker.clone());
                let unchanged = self
                    .detail_sub
                    .as_ref()
                    .is_some_and(|sub| *sub.key() == detail_key);
                if unchanged {
                    self.details.set_enabled(&detail_key, gate.detail);
                } else {
                    debug!(key = %detail_key, "detail key changed");
                    self.detail_sub = Some(self.details.get_or_fetch(
                        detail_key,
                        detail_fetcher(&self.gateway, &ticker),
                        QueryPolicy::polling(self.cadence.detail).with_enabled(gate.detail),
                    ));
                }
            }
            None => self.detail_sub = None,
        }

        self.alerts.set_enabled(self.alerts_sub.key(), gate.alerts);
        self.gate = gate;
    }
}

fn list_fetcher(gateway: &Arc<dyn MarketGateway>, controller: &ViewController) -> Fetcher<StockPage> {
    let gateway = Arc::clone(gateway);
    let state = controller.state();
    let query = StocksQuery::new(state.page, controller.page_size(), &state.search);
    fetcher_fn(move || {
        let gateway = Arc::clone(&gateway);
        let query = query.clone();
        async move { gateway.fetch_stocks(query).await }
    })
}

fn detail_fetcher(gateway: &Arc<dyn MarketGateway>, ticker: &str) -> Fetcher<StockDetail> {
    let gateway = Arc::clone(gateway);
    let ticker = ticker.to_string();
    fetcher_fn(move || {
        let gateway = Arc::clone(&gateway);
        let ticker = ticker.clone();
        async move { gateway.fetch_stock_detail(&ticker).await }
    })
}

fn alerts_fetcher(gateway: &Arc<dyn MarketGateway>) -> Fetcher<Vec<WhaleAlert>> {
    let gateway = Arc::clone(gateway);
    fetcher_fn(move || {
        let gateway = Arc::clone(&gateway);
        async move { gateway.fetch_whale_alerts().await }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry<T>(data: Option<T>, status: QueryStatus, error: Option<FetchError>) -> CacheEntry<T> {
        CacheEntry {
            data,
            status,
            last_fetched_at: None,
            error,
            is_fetching: false,
        }
    }

    fn network() -> FetchError {
        FetchError::Network("connection refused".to_string())
    }

    #[test]
    fn test_resolve_panel() {
        struct TestCase {
            input: CacheEntry<Vec<u32>>,
            placeholder: Option<Vec<u32>>,
            expected: PanelState<Vec<u32>>,
        }

        let tests = vec![
            TestCase {
                // TC0: first load without placeholder
                input: entry(None, QueryStatus::Loading, None),
                placeholder: None,
                expected: PanelState::Loading,
            },
            TestCase {
                // TC1: first load keeps the previous page on screen
                input: entry(None, QueryStatus::Loading, None),
                placeholder: Some(vec![1]),
                expected: PanelState::Ready(PanelData {
                    data: vec![1],
                    stale_error: None,
                    refreshing: true,
                    placeholder: true,
                    last_fetched_at: None,
                }),
            },
            TestCase {
                // TC2: failure without data is explicit, never an empty list
                input: entry(None, QueryStatus::Error, Some(network())),
                placeholder: Some(vec![1]),
                expected: PanelState::Failed(network()),
            },
            TestCase {
                // TC3: failed refresh keeps the last good data
                input: entry(Some(vec![7]), QueryStatus::Error, Some(network())),
                placeholder: None,
                expected: PanelState::Ready(PanelData {
                    data: vec![7],
                    stale_error: Some(network()),
                    refreshing: false,
                    placeholder: false,
                    last_fetched_at: None,
                }),
            },
            TestCase {
                // TC4: successful zero-row result
                input: entry(Some(vec![]), QueryStatus::Success, None),
                placeholder: Some(vec![1]),
                expected: PanelState::Empty { stale_error: None },
            },
            TestCase {
                // TC5: never enabled
                input: entry(None, QueryStatus::Idle, None),
                placeholder: Some(vec![1]),
                expected: PanelState::Idle,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = resolve_panel(test.input, test.placeholder, Vec::is_empty);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_panel_map_keeps_flags() {
        let state = resolve_panel(
            entry(Some(vec![2_u32]), QueryStatus::Error, Some(network())),
            None,
            Vec::is_empty,
        )
        .map(|values| values.len());

        match state {
            PanelState::Ready(ready) => {
                assert_eq!(ready.data, 1);
                assert_eq!(ready.stale_error, Some(network()));
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }
}

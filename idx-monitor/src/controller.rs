//! Pagination/Search Controller.
//!
//! Owns the process-wide [`ViewState`]. Every change goes through a named transition; fetch
//! results never write to it except through [`ViewController::set_total_pages`], which only
//! moves the paging bound.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::query::QueryKey;

/// Which of the two top-level views is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize, Display)]
pub enum ActiveView {
    /// Stock list and price chart
    #[default]
    #[display("Market Data")]
    Dashboard,
    /// Whale alert feed
    #[display("Whale Alerts")]
    Whales,
}

impl ActiveView {
    pub fn toggle(self) -> Self {
        match self {
            ActiveView::Dashboard => ActiveView::Whales,
            ActiveView::Whales => ActiveView::Dashboard,
        }
    }
}

/// User-driven view state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ViewState {
    pub active_view: ActiveView,
    pub selected_ticker: Option<String>,
    /// 1-based page number
    pub page: u32,
    pub search: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            active_view: ActiveView::Dashboard,
            selected_ticker: None,
            page: 1,
            search: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewController {
    state: ViewState,
    page_size: u32,
    total_pages: u32,
}

impl ViewController {
    pub fn new(page_size: u32, selected_ticker: Option<String>) -> Self {
        Self {
            state: ViewState {
                selected_ticker,
                ..ViewState::default()
            },
            page_size: page_size.max(1),
            total_pages: 1,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn page(&self) -> u32 {
        self.state.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Update the search term. Always restarts pagination at page 1.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.state.search = term.into();
        self.state.page = 1;
    }

    /// Jump to page `n`. Out-of-range requests are ignored and return `false`.
    pub fn set_page(&mut self, n: u32) -> bool {
        if n < 1 || n > self.total_pages {
            return false;
        }
        self.state.page = n;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.state.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> bool {
        self.set_page(self.state.page.saturating_sub(1))
    }

    /// Previous-page button state: disabled exactly on page 1.
    pub fn has_prev(&self) -> bool {
        self.state.page > 1
    }

    /// Next-page button state: disabled exactly on the last page.
    pub fn has_next(&self) -> bool {
        self.state.page < self.total_pages
    }

    /// Select the ticker shown in the chart. Paging and search are untouched.
    pub fn select_ticker(&mut self, ticker: impl Into<String>) {
        let ticker = ticker.into();
        let ticker = ticker.trim();
        if !ticker.is_empty() {
            self.state.selected_ticker = Some(ticker.to_string());
        }
    }

    pub fn switch_view(&mut self, view: ActiveView) {
        self.state.active_view = view;
    }

    /// Record the page count reported by the latest successful list fetch.
    ///
    /// An empty result (0 pages) still has one page. The current page is pulled back inside
    /// the new bound when the bound shrinks.
    pub fn set_total_pages(&mut self, total_pages: u32) {
        self.total_pages = total_pages.max(1);
        if self.state.page > self.total_pages {
            self.state.page = self.total_pages;
        }
    }

    /// Key of the list query for the current page and search.
    pub fn list_key(&self) -> QueryKey {
        QueryKey::stocks(self.state.page, self.page_size, self.state.search.clone())
    }

    /// Key of the detail query, `None` while nothing is selected.
    pub fn detail_key(&self) -> Option<QueryKey> {
        self.state
            .selected_ticker
            .as_ref()
            .map(|ticker| QueryKey::stock_detail(ticker.clone()))
    }

    pub fn alerts_key(&self) -> QueryKey {
        QueryKey::WhaleAlerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(total_pages: u32) -> ViewController {
        let mut controller = ViewController::new(10, Some("BBCA".to_string()));
        controller.set_total_pages(total_pages);
        controller
    }

    #[test]
    fn test_set_search_resets_page() {
        struct TestCase {
            page: u32,
            search: &'static str,
        }

        let tests = vec![
            TestCase {
                // TC0: from the last page, new term
                page: 5,
                search: "bank",
            },
            TestCase {
                // TC1: from a middle page, cleared term
                page: 3,
                search: "",
            },
            TestCase {
                // TC2: already on page 1
                page: 1,
                search: "adro",
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let mut controller = controller(5);
            assert!(controller.set_page(test.page), "TC{} setup failed", index);

            controller.set_search(test.search);

            assert_eq!(controller.page(), 1, "TC{} failed", index);
            assert_eq!(
                controller.list_key(),
                QueryKey::stocks(1, 10, test.search),
                "TC{} failed",
                index
            );
        }
    }

    #[test]
    fn test_set_page_out_of_range_is_noop() {
        let mut controller = controller(4);
        assert!(controller.set_page(2));

        assert!(!controller.set_page(0));
        assert_eq!(controller.page(), 2);

        assert!(!controller.set_page(5));
        assert_eq!(controller.page(), 2);

        assert!(controller.set_page(4));
        assert_eq!(controller.page(), 4);
    }

    #[test]
    fn test_boundary_buttons() {
        let mut controller = controller(3);
        assert!(!controller.has_prev());
        assert!(controller.has_next());
        assert!(!controller.prev_page());

        assert!(controller.next_page());
        assert!(controller.has_prev());
        assert!(controller.has_next());

        assert!(controller.next_page());
        assert!(controller.has_prev());
        assert!(!controller.has_next());
        assert!(!controller.next_page());
        assert_eq!(controller.page(), 3);
    }

    #[test]
    fn test_single_page_disables_both_buttons() {
        let controller = controller(0);
        assert_eq!(controller.total_pages(), 1);
        assert!(!controller.has_prev());
        assert!(!controller.has_next());
    }

    #[test]
    fn test_total_pages_shrink_clamps_page() {
        let mut controller = controller(10);
        assert!(controller.set_page(8));

        controller.set_total_pages(3);
        assert_eq!(controller.page(), 3);
    }

    #[test]
    fn test_select_ticker_keeps_paging() {
        let mut controller = controller(5);
        controller.set_search("b");
        assert!(controller.set_page(2));

        controller.select_ticker("BMRI");

        assert_eq!(controller.page(), 2);
        assert_eq!(controller.state().search, "b");
        assert_eq!(controller.detail_key(), Some(QueryKey::stock_detail("BMRI")));

        controller.select_ticker("  ");
        assert_eq!(controller.state().selected_ticker.as_deref(), Some("BMRI"));
    }

    #[test]
    fn test_no_selection_has_no_detail_key() {
        let controller = ViewController::new(10, None);
        assert_eq!(controller.detail_key(), None);
        assert_eq!(controller.state().active_view, ActiveView::Dashboard);
    }

    #[test]
    fn test_switch_view() {
        let mut controller = controller(2);
        controller.switch_view(ActiveView::Whales);
        assert_eq!(controller.state().active_view, ActiveView::Whales);
        assert_eq!(controller.state().active_view.toggle(), ActiveView::Dashboard);
        assert_eq!(ActiveView::Whales.to_string(), "Whale Alerts");
    }
}

//! View Activation Gate: which queries may poll for the view on screen.

use crate::controller::{ActiveView, ViewState};

/// Per-query enabled flags derived from a [`ViewState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewGate {
    pub list: bool,
    pub detail: bool,
    pub alerts: bool,
}

impl ViewGate {
    pub fn for_state(state: &ViewState) -> Self {
        let on_dashboard = state.active_view == ActiveView::Dashboard;
        Self {
            list: on_dashboard,
            detail: on_dashboard && state.selected_ticker.is_some(),
            alerts: state.active_view == ActiveView::Whales,
        }
    }
}

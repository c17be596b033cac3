//! Query identity and polling policy.

use std::time::Duration;

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Structural identifier of one cacheable request shape.
///
/// Two keys with the same resource and the same parameter values address the same cache
/// entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, Display)]
pub enum QueryKey {
    #[display("stocks(page={page}, limit={page_size}, search={search:?})")]
    Stocks {
        page: u32,
        page_size: u32,
        search: String,
    },

    #[display("stock({ticker})")]
    StockDetail { ticker: String },

    #[display("whale-alerts")]
    WhaleAlerts,
}

impl QueryKey {
    pub fn stocks(page: u32, page_size: u32, search: impl Into<String>) -> Self {
        Self::Stocks {
            page,
            page_size,
            search: search.into(),
        }
    }

    pub fn stock_detail(ticker: impl Into<String>) -> Self {
        Self::StockDetail {
            ticker: ticker.into(),
        }
    }
}

/// How an entry is kept fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    /// Refetch automatically after this interval while observed and enabled.
    pub refresh_interval: Option<Duration>,
    /// `false` suspends fetching and scheduling for the key.
    pub enabled: bool,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            refresh_interval: None,
            enabled: true,
        }
    }
}

impl QueryPolicy {
    /// Enabled policy that refetches every `interval`.
    pub fn polling(interval: Duration) -> Self {
        Self {
            refresh_interval: Some(interval),
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether scheduled refreshes should run under this policy.
    pub fn is_polling(&self) -> bool {
        self.enabled && self.refresh_interval.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_query_key_structural_equality() {
        let mut keys = HashSet::new();
        keys.insert(QueryKey::stocks(1, 10, ""));
        keys.insert(QueryKey::stocks(1, 10, ""));
        keys.insert(QueryKey::stocks(2, 10, ""));
        keys.insert(QueryKey::stocks(1, 10, "bb"));
        keys.insert(QueryKey::stock_detail("BBCA"));
        keys.insert(QueryKey::stock_detail("BBCA"));
        keys.insert(QueryKey::WhaleAlerts);

        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn test_query_key_display() {
        assert_eq!(
            QueryKey::stocks(2, 10, "bank").to_string(),
            r#"stocks(page=2, limit=10, search="bank")"#
        );
        assert_eq!(QueryKey::stock_detail("ADRO").to_string(), "stock(ADRO)");
        assert_eq!(QueryKey::WhaleAlerts.to_string(), "whale-alerts");
    }

    #[test]
    fn test_policy_polling() {
        let policy = QueryPolicy::polling(Duration::from_secs(10));
        assert!(policy.is_polling());
        assert!(!policy.with_enabled(false).is_polling());
        assert!(!QueryPolicy::default().is_polling());
    }
}

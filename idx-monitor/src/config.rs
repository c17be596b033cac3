//! Monitor configuration
//!
//! Defaults: backend on `localhost:8000/api`, ten rows per page, `BBCA` selected on start-up.
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Refresh cadences for the three polled resources
///
/// These intervals are part of the observable behaviour and are not read from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshCadence {
    /// Paginated stock list
    pub stocks: Duration,
    /// Selected ticker detail and history
    pub detail: Duration,
    /// Whale alert feed
    pub alerts: Duration,
}

impl Default for RefreshCadence {
    fn default() -> Self {
        Self {
            stocks: Duration::from_secs(10),
            detail: Duration::from_secs(60),
            alerts: Duration::from_secs(30),
        }
    }
}

/// IDX monitor configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Base URL of the data service, including the `/api` prefix
    pub api_url: String,
    /// Rows requested per list page
    pub page_size: u32,
    /// Ticker selected on start-up, `None` to start with an empty chart
    pub default_ticker: Option<String>,
    /// Background refresh intervals
    pub cadence: RefreshCadence,
}

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_TICKER: &str = "BBCA";

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            default_ticker: Some(DEFAULT_TICKER.to_string()),
            cadence: RefreshCadence::default(),
        }
    }
}

impl MonitorConfig {
    /// Create a configuration for a custom data service URL
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        parse_api_url(api_url)?;
        Ok(Self {
            api_url: api_url.trim().trim_end_matches('/').to_string(),
            ..Default::default()
        })
    }

    /// Build a configuration from `IDX_API_URL`, `IDX_PAGE_SIZE` and `IDX_DEFAULT_TICKER`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup("IDX_API_URL") {
            Some(url) => Self::new(&url)?,
            None => Self::default(),
        };

        if let Some(raw) = lookup("IDX_PAGE_SIZE") {
            let page_size = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "IDX_PAGE_SIZE",
                    value: raw.clone(),
                })?;
            config = config.with_page_size(page_size);
        }

        if let Some(ticker) = lookup("IDX_DEFAULT_TICKER") {
            config = config.with_default_ticker(Some(ticker));
        }

        Ok(config)
    }

    /// Set rows per page
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set the ticker selected on start-up (blank clears the selection)
    pub fn with_default_ticker(mut self, ticker: Option<String>) -> Self {
        self.default_ticker = ticker
            .map(|ticker| ticker.trim().to_uppercase())
            .filter(|ticker| !ticker.is_empty());
        self
    }

    /// Parsed and checked [`Url`] of the data service
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        parse_api_url(&self.api_url)
    }

    /// Set refresh cadences
    pub fn with_cadence(mut self, cadence: RefreshCadence) -> Self {
        self.cadence = cadence;
        self
    }
}

pub(crate) fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|error| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: error.to_string(),
    })?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: "expected an http(s) base url".to_string(),
        });
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = MonitorConfig::default();
        assert_eq!(config.api_url, "http://localhost:8000/api");
        assert!(config.base_url().is_ok());
        assert_eq!(config.page_size, 10);
        assert_eq!(config.default_ticker.as_deref(), Some("BBCA"));
        assert_eq!(config.cadence.stocks, Duration::from_secs(10));
        assert_eq!(config.cadence.detail, Duration::from_secs(60));
        assert_eq!(config.cadence.alerts, Duration::from_secs(30));
    }

    #[test]
    fn test_config_builder() {
        let config = MonitorConfig::new("https://idx.example.com/api")
            .unwrap()
            .with_page_size(25)
            .with_default_ticker(Some(" adro ".to_string()));

        assert_eq!(config.base_url().unwrap().host_str(), Some("idx.example.com"));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.default_ticker.as_deref(), Some("ADRO"));
    }

    #[test]
    fn test_config_from_lookup() {
        let vars = HashMap::from([
            ("IDX_API_URL", "http://10.0.0.5:8000/api"),
            ("IDX_PAGE_SIZE", "20"),
            ("IDX_DEFAULT_TICKER", ""),
        ]);

        let config =
            MonitorConfig::from_lookup(|name| vars.get(name).map(|value| value.to_string()))
                .unwrap();

        assert_eq!(config.api_url, "http://10.0.0.5:8000/api");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.default_ticker, None);
    }

    #[test]
    fn test_config_rejects_invalid_values() {
        struct TestCase {
            vars: Vec<(&'static str, &'static str)>,
        }

        let tests = vec![
            TestCase {
                // TC0: unparseable url
                vars: vec![("IDX_API_URL", "not a url")],
            },
            TestCase {
                // TC1: non-http scheme
                vars: vec![("IDX_API_URL", "mailto:ops@example.com")],
            },
            TestCase {
                // TC2: zero page size
                vars: vec![("IDX_PAGE_SIZE", "0")],
            },
            TestCase {
                // TC3: non-numeric page size
                vars: vec![("IDX_PAGE_SIZE", "ten")],
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let vars: HashMap<_, _> = test.vars.into_iter().collect();
            let actual =
                MonitorConfig::from_lookup(|name| vars.get(name).map(|value| value.to_string()));
            assert!(actual.is_err(), "TC{} failed", index);
        }
    }
}

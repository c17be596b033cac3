/// Response schemas for the IDX data service
///
/// These types match the JSON payloads served under `/api` by the backend
/// (`/stocks`, `/stock/{ticker}`, `/whale-alerts`).
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// One row of the paginated stock list
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StockSummary {
    /// Exchange ticker without the `.JK` suffix (e.g., "BBCA")
    pub ticker: String,
    /// Company name
    pub name: String,
    /// Last traded price in IDR (0.0 when the backend could not price it)
    pub last_price: f64,
    /// Change versus previous close, already multiplied by 100
    pub change_percent: f64,
}

impl StockSummary {
    pub fn is_up(&self) -> bool {
        self.change_percent >= 0.0
    }
}

/// Envelope returned by `GET /stocks`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StockPage {
    /// Rows on this page
    pub data: Vec<StockSummary>,
    /// Number of pages for the current search (0 when nothing matched)
    pub total_pages: u32,
    /// Total matching rows across all pages
    #[serde(default)]
    pub total: Option<u64>,
    /// Page number echoed back by the server
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size echoed back by the server
    #[serde(default)]
    pub limit: Option<u32>,
}

impl StockPage {
    /// A successful response without rows. This is a valid result, not a failure.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn validate(self) -> Result<Self, FetchError> {
        if let Some(row) = self.data.iter().find(|row| row.last_price < 0.0) {
            return Err(FetchError::Decode(format!(
                "negative last_price for {}",
                row.ticker
            )));
        }
        Ok(self)
    }
}

/// One closing price in a ticker's history
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HistoryPoint {
    /// Trading day, serialised as `YYYY-MM-DD`
    pub date: NaiveDate,
    /// Closing price in IDR
    pub price: f64,
}

/// Quote and one month of daily history returned by `GET /stock/{ticker}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StockDetail {
    pub ticker: String,
    pub name: String,
    pub last_price: f64,
    pub change_percent: f64,
    /// Ordered oldest to newest
    pub history: Vec<HistoryPoint>,
}

impl StockDetail {
    pub fn is_up(&self) -> bool {
        self.change_percent >= 0.0
    }

    /// Lowest and highest closing price in the history, if any.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        self.history.iter().fold(None, |range, point| match range {
            None => Some((point.price, point.price)),
            Some((low, high)) => Some((low.min(point.price), high.max(point.price))),
        })
    }

    pub fn validate(self) -> Result<Self, FetchError> {
        if self.ticker.trim().is_empty() {
            return Err(FetchError::Decode("stock detail without ticker".to_string()));
        }
        if let Some(pair) = self
            .history
            .windows(2)
            .find(|pair| pair[1].date < pair[0].date)
        {
            return Err(FetchError::Decode(format!(
                "history for {} out of order: {} after {}",
                self.ticker, pair[1].date, pair[0].date
            )));
        }
        Ok(self)
    }
}

/// Unusual-volume record returned by `GET /whale-alerts`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WhaleAlert {
    pub ticker: String,
    pub name: String,
    /// Last traded price (older servers omit it)
    #[serde(default)]
    pub price: Option<f64>,
    pub change_percent: f64,
    /// Today's traded volume
    pub volume: f64,
    /// Trailing three-month average volume
    pub avg_volume: f64,
    /// `volume / avg_volume`, computed upstream. Missing or null when undefined.
    #[serde(default)]
    pub volume_ratio: Option<f64>,
    /// Upstream classification label (e.g., "Major Whale Accumulation")
    pub signal: String,
}

impl WhaleAlert {
    pub fn is_up(&self) -> bool {
        self.change_percent >= 0.0
    }
}

/// Validate a whale-alert batch: tickers must be unique within one response, volumes and
/// ratios non-negative.
pub fn validate_alerts(alerts: Vec<WhaleAlert>) -> Result<Vec<WhaleAlert>, FetchError> {
    let mut seen = std::collections::HashSet::with_capacity(alerts.len());
    for alert in &alerts {
        if !seen.insert(alert.ticker.as_str()) {
            return Err(FetchError::Decode(format!(
                "duplicate whale alert for {}",
                alert.ticker
            )));
        }
        if alert.volume < 0.0 || alert.avg_volume < 0.0 {
            return Err(FetchError::Decode(format!(
                "negative volume for {}",
                alert.ticker
            )));
        }
        if alert.volume_ratio.is_some_and(|ratio| ratio < 0.0) {
            return Err(FetchError::Decode(format!(
                "negative volume ratio for {}",
                alert.ticker
            )));
        }
    }
    Ok(alerts)
}

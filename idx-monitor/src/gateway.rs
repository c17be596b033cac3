//! Remote Data Gateway: typed, uncached access to the IDX data service.
//!
//! Every failure is converted into a [`FetchError`] here; callers never see a raw transport
//! or serde error.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;
use url::Url;

use crate::{
    config::MonitorConfig,
    error::{ConfigError, FetchError},
    types::{StockDetail, StockPage, WhaleAlert, validate_alerts},
};

/// Query string for `GET /stocks`.
///
/// `search` is omitted entirely when empty rather than sent as `search=`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StocksQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl StocksQuery {
    pub fn new(page: u32, limit: u32, search: &str) -> Self {
        let search = search.trim();
        Self {
            page,
            limit,
            search: (!search.is_empty()).then(|| search.to_string()),
        }
    }
}

/// Read-only access to the three endpoints the monitor polls.
#[async_trait]
pub trait MarketGateway: Send + Sync {
    async fn fetch_stocks(&self, query: StocksQuery) -> Result<StockPage, FetchError>;

    async fn fetch_stock_detail(&self, ticker: &str) -> Result<StockDetail, FetchError>;

    async fn fetch_whale_alerts(&self) -> Result<Vec<WhaleAlert>, FetchError>;
}

/// [`MarketGateway`] over HTTP + JSON.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(config: &MonitorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: config.base_url()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base url, keeping its `/api` prefix.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Network(format!("cannot extend base url {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<Q, T>(&self, url: Url, query: Option<&Q>) -> Result<T, FetchError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.get(url.clone());
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!(%url, status = status.as_u16(), bytes = body.len(), "gateway response");

        if !status.is_success() {
            return Err(FetchError::server(
                status.as_u16(),
                &String::from_utf8_lossy(&body),
            ));
        }

        decode(&body)
    }
}

#[async_trait]
impl MarketGateway for HttpGateway {
    async fn fetch_stocks(&self, query: StocksQuery) -> Result<StockPage, FetchError> {
        let url = self.endpoint(&["stocks"])?;
        let page: StockPage = self.get_json(url, Some(&query)).await?;
        page.validate()
    }

    async fn fetch_stock_detail(&self, ticker: &str) -> Result<StockDetail, FetchError> {
        let url = self.endpoint(&["stock", ticker])?;
        let detail: StockDetail = self.get_json::<(), _>(url, None).await?;
        detail.validate()
    }

    async fn fetch_whale_alerts(&self) -> Result<Vec<WhaleAlert>, FetchError> {
        let url = self.endpoint(&["whale-alerts"])?;
        let alerts: Vec<WhaleAlert> = self.get_json::<(), _>(url, None).await?;
        validate_alerts(alerts)
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, FetchError> {
    serde_json::from_slice(body).map_err(FetchError::from)
}

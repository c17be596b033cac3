use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on how much of a non-2xx response body is kept in a [`FetchError::Server`].
const MAX_ERROR_BODY_CHARS: usize = 200;

/// All errors a single fetch against the remote data service can produce.
///
/// A `FetchError` never terminates the monitor; it is stored on the affected cache entry and
/// the next scheduled refresh retries.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server responded with status {status}: {message}")]
    Server { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Coarse category of a [`FetchError`], used by the render layer to pick a message.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize, Display)]
pub enum FetchErrorKind {
    #[display("service unreachable")]
    Network,
    #[display("server error")]
    Server,
    #[display("unexpected response")]
    Decode,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Network(_) => FetchErrorKind::Network,
            FetchError::Server { .. } => FetchErrorKind::Server,
            FetchError::Decode(_) => FetchErrorKind::Decode,
        }
    }

    /// Construct a [`FetchError::Server`], truncating the response body to a loggable size.
    pub fn server(status: u16, body: &str) -> Self {
        let message = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
        Self::Server { status, message }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else if let Some(status) = value.status() {
            Self::server(status.as_u16(), &value.to_string())
        } else {
            Self::Network(value.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

/// Errors raised while building a [`MonitorConfig`](crate::config::MonitorConfig) or a gateway.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid api url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

//! Remote quote endpoint client
//!
//! Fetches a small batch of remote records and posts newly added quotes.
//! Every remote record becomes a quote in the "Server" category.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{Quote, SERVER_CATEGORY};

/// Only this many remote records are used per fetch
pub const REMOTE_BATCH_LIMIT: usize = 5;

/// Errors talking to the remote endpoint
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Connection, timeout, or body read failure
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    /// Response body was not the expected JSON
    #[error("Invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Something the sync engine can pull quotes from and push quotes to
///
/// Both calls absorb their own failures.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch remote quotes; empty on any failure
    async fn fetch_quotes(&self) -> Vec<Quote>;

    /// Best-effort upload of one quote
    async fn push_quote(&self, quote: &Quote);
}

/// Map a remote response body into quotes
///
/// Takes the first [`REMOTE_BATCH_LIMIT`] records and skips any without a
/// usable `title`.
pub fn parse_remote_quotes(body: &str) -> Result<Vec<Quote>, serde_json::Error> {
    let records: Vec<Value> = serde_json::from_str(body)?;
    Ok(records
        .iter()
        .take(REMOTE_BATCH_LIMIT)
        .filter_map(|record| record.get("title").and_then(Value::as_str))
        .filter_map(|title| Quote::new(title, SERVER_CATEGORY).ok())
        .collect())
}

/// HTTP client for the remote quote endpoint
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    fetch_url: String,
    push_url: String,
}

impl RemoteClient {
    /// Create a client with a per-request timeout
    pub fn new(
        fetch_url: impl Into<String>,
        push_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            http,
            fetch_url: fetch_url.into(),
            push_url: push_url.into(),
        })
    }

    /// Create a client from the configured endpoints and timeout
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        Self::new(
            config.effective_remote_url(),
            config.effective_push_url(),
            config.request_timeout(),
        )
    }

    /// Endpoint quotes are fetched from
    pub fn fetch_url(&self) -> &str {
        &self.fetch_url
    }

    /// Endpoint quotes are posted to
    pub fn push_url(&self) -> &str {
        &self.push_url
    }

    /// Fetch remote quotes, reporting failures
    pub async fn try_fetch(&self) -> Result<Vec<Quote>, TransportError> {
        debug!("Fetching remote quotes from {}", self.fetch_url);

        let response = self
            .http
            .get(&self.fetch_url)
            .send()
            .await
            .map_err(|source| self.request_error(&self.fetch_url, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: self.fetch_url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| self.request_error(&self.fetch_url, source))?;

        parse_remote_quotes(&body).map_err(|source| TransportError::Decode {
            url: self.fetch_url.clone(),
            source,
        })
    }

    /// Post one quote, returning the response body
    pub async fn try_push(&self, quote: &Quote) -> Result<String, TransportError> {
        debug!("Posting quote to {}", self.push_url);

        let response = self
            .http
            .post(&self.push_url)
            .json(quote)
            .send()
            .await
            .map_err(|source| self.request_error(&self.push_url, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: self.push_url.clone(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| self.request_error(&self.push_url, source))
    }

    fn request_error(&self, url: &str, source: reqwest::Error) -> TransportError {
        TransportError::Request {
            url: url.to_string(),
            source,
        }
    }
}

#[async_trait]
impl RemoteSource for RemoteClient {
    async fn fetch_quotes(&self) -> Vec<Quote> {
        match self.try_fetch().await {
            Ok(quotes) => {
                debug!("Fetched {} remote quotes", quotes.len());
                quotes
            }
            Err(e) => {
                warn!("Remote fetch failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn push_quote(&self, quote: &Quote) {
        match self.try_push(quote).await {
            Ok(body) => info!("Posted quote to server: {}", body.trim()),
            Err(e) => warn!("Failed to post quote: {}", e),
        }
    }
}

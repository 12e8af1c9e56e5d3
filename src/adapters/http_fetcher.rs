//! Page fetcher over HTTP.
//!
//! One GET per call, bounded by a timeout, no retries. Every failure is
//! reported as a [`FetchError`] naming the URL.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::SourceConfig;
use crate::error::{FetchCause, FetchError, LblError, Result};

/// Source of raw page markup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> std::result::Result<String, FetchError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| LblError::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http })
    }

    pub fn from_config(source: &SourceConfig) -> Result<Self> {
        Self::new(&source.user_agent)
    }
}

fn classify(error: &reqwest::Error, timeout: Duration) -> FetchCause {
    if error.is_timeout() {
        FetchCause::Timeout {
            secs: timeout.as_secs(),
        }
    } else if error.is_connect() {
        FetchCause::Connect(error.to_string())
    } else if let Some(status) = error.status() {
        FetchCause::Status(status.as_u16())
    } else if error.is_body() || error.is_decode() {
        FetchCause::Body(error.to_string())
    } else {
        FetchCause::Other(error.to_string())
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> std::result::Result<String, FetchError> {
        debug!(url, "fetching page");
        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::new(url, classify(&e, timeout)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(url, FetchCause::Status(status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::new(url, classify(&e, timeout)))?;
        debug!(url, bytes = body.len(), "page fetched");
        Ok(body)
    }
}

//! The network retrieval boundary.
//!
//! The engine never talks to `reqwest` directly; it goes through the
//! [`Fetcher`] trait so that catalog building can be exercised against
//! canned markup in tests and alternative transports in applications.

use crate::error::ScrapeError;
use async_trait::async_trait;
use std::time::Duration;

/// Turns a URL into raw markup.
///
/// A failed retrieval is recoverable for everything except the first
/// index page; callers decide how to degrade.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieves the markup at `url`.
    async fn retrieve(&self, url: &str) -> Result<String, ScrapeError>;
}

/// HTTP fetcher backed by a shared `reqwest` client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates an HTTP fetcher with browser-like defaults.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn retrieve(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Applies the inter-batch courtesy pause.
pub async fn courtesy_pause(delay_sec: f64) {
    if delay_sec > 0.0 {
        tokio::time::sleep(Duration::from_secs_f64(delay_sec)).await;
    }
}

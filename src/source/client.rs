use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use super::PageFetcher;
use crate::config::SourceConfig;
use crate::{ForecastError, Result};

/// reqwest-backed page fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new fetcher with the configured timeout and user agent
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[tracing::instrument(name = "fetch_page", level = "debug", skip(self, url), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ForecastError::network(format!("Request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::network(format!(
                "{url} answered with status {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ForecastError::network(format!("Failed to read body of {url}: {e}")))?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

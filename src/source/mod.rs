//! Forecast site access
//!
//! This module covers everything that touches mountain-forecast.com pages:
//! - Fetching pages over HTTP with a fixed politeness delay
//! - Building the mountain catalog from the directory and elevation pages
//! - Reshaping forecast tables into forecast records

pub mod catalog;
pub mod client;
pub mod forecast;
pub mod html;

use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

use crate::Result;

pub use catalog::{CacheLookup, CatalogLoader};
pub use client::HttpFetcher;
pub use forecast::{ForecastExtractor, parse_forecast_page};

/// Source of raw page HTML
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page at `url` and return its body
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// Politeness delay between consecutive requests
pub(crate) async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

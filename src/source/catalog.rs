//! Mountain catalog loading
//!
//! The catalog is read from a JSON cache when one exists. Otherwise the
//! directory page is crawled: one request for the listing, then one request
//! per mountain for its elevation selector. A successful crawl is written
//! back to the cache so later runs skip it.
//!
//! Any missing list or link during a crawl aborts the whole crawl; no
//! partial catalog is ever cached.

use reqwest::Url;
use scraper::Html;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::html::{element_text, resolve, selector};
use super::{PageFetcher, pause};
use crate::models::MountainCatalog;
use crate::{ForecastError, Result};

const MOUNTAIN_LIST: &str = "ul.b-list-table";
const MOUNTAIN_ITEM: &str = "li";
const ITEM_LINK: &str = "a";
const ELEVATION_LIST: &str = "ul.b-elevation__container";
const ELEVATION_LINK: &str = "a.js-elevation-link";

/// Outcome of reading the catalog cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(MountainCatalog),
    /// No cache file yet; a crawl is expected
    Absent,
}

/// Read the catalog cache.
///
/// A missing file is [`CacheLookup::Absent`]. A file that exists but cannot be
/// read or decoded is a [`ForecastError::Cache`] error.
pub fn load_cached(path: &Path) -> Result<CacheLookup> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CacheLookup::Absent),
        Err(e) => {
            return Err(ForecastError::cache(format!(
                "Failed to read catalog cache {}: {e}",
                path.display()
            )));
        }
    };

    let catalog: MountainCatalog = serde_json::from_str(&text).map_err(|e| {
        ForecastError::cache(format!(
            "Catalog cache {} is corrupt: {e}",
            path.display()
        ))
    })?;
    Ok(CacheLookup::Hit(catalog))
}

/// Write the catalog cache, creating parent directories as needed
pub fn store_cached(path: &Path, catalog: &MountainCatalog) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(catalog)
        .map_err(|e| ForecastError::cache(format!("Failed to encode catalog: {e}")))?;
    fs::write(path, json)?;
    Ok(())
}

/// Mountain entries (name, page URL) listed on the directory page
pub fn parse_directory(html: &str, base_url: &Url) -> Result<Vec<(String, Url)>> {
    let document = Html::parse_document(html);
    let list_selector = selector(MOUNTAIN_LIST)?;
    let item_selector = selector(MOUNTAIN_ITEM)?;
    let link_selector = selector(ITEM_LINK)?;

    let list = document
        .select(&list_selector)
        .next()
        .ok_or_else(|| ForecastError::parse("Directory page has no mountain list"))?;

    let mut entries = Vec::new();
    for (position, item) in list.select(&item_selector).enumerate() {
        let link = item.select(&link_selector).next().ok_or_else(|| {
            ForecastError::parse(format!("Mountain list item {position} has no link"))
        })?;
        let name = element_text(link);
        let href = link.value().attr("href").ok_or_else(|| {
            ForecastError::parse(format!("Mountain link '{name}' has no href"))
        })?;
        entries.push((name, resolve(base_url, href)?));
    }

    if entries.is_empty() {
        return Err(ForecastError::parse("Directory mountain list is empty"));
    }
    Ok(entries)
}

/// Absolute elevation-band URLs listed on a mountain page
pub fn parse_elevation_links(html: &str, base_url: &Url) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let list_selector = selector(ELEVATION_LIST)?;
    let link_selector = selector(ELEVATION_LINK)?;

    let list = document
        .select(&list_selector)
        .next()
        .ok_or_else(|| ForecastError::parse("Mountain page has no elevation selector"))?;

    let urls = list
        .select(&link_selector)
        .map(|link| -> Result<String> {
            let href = link
                .value()
                .attr("href")
                .ok_or_else(|| ForecastError::parse("Elevation link has no href"))?;
            resolve(base_url, href).map(String::from)
        })
        .collect::<Result<Vec<_>>>()?;

    if urls.is_empty() {
        return Err(ForecastError::parse("Elevation selector has no links"));
    }
    Ok(urls)
}

/// Builds the mountain catalog from cache or by crawling the site
pub struct CatalogLoader<'a> {
    fetcher: &'a dyn PageFetcher,
    base_url: Url,
    delay: Duration,
}

impl<'a> CatalogLoader<'a> {
    #[must_use]
    pub fn new(fetcher: &'a dyn PageFetcher, base_url: Url, delay: Duration) -> Self {
        Self {
            fetcher,
            base_url,
            delay,
        }
    }

    /// Catalog from `cache_path`, crawling `directory_url` on a cache miss
    pub async fn get_catalog(
        &self,
        cache_path: &Path,
        directory_url: &Url,
    ) -> Result<MountainCatalog> {
        match load_cached(cache_path)? {
            CacheLookup::Hit(catalog) => {
                info!(
                    "Loaded {} mountains ({} elevation pages) from {}",
                    catalog.len(),
                    catalog.url_count(),
                    cache_path.display()
                );
                Ok(catalog)
            }
            CacheLookup::Absent => {
                warn!(
                    "No catalog cache at {}, crawling {}",
                    cache_path.display(),
                    directory_url
                );
                self.refresh(cache_path, directory_url).await
            }
        }
    }

    /// Crawl unconditionally and overwrite the cache
    pub async fn refresh(&self, cache_path: &Path, directory_url: &Url) -> Result<MountainCatalog> {
        let catalog = self.crawl(directory_url).await?;
        store_cached(cache_path, &catalog)?;
        info!(
            "Cached {} mountains ({} elevation pages) at {}",
            catalog.len(),
            catalog.url_count(),
            cache_path.display()
        );
        Ok(catalog)
    }

    /// Crawl the directory page and every mountain's elevation selector
    pub async fn crawl(&self, directory_url: &Url) -> Result<MountainCatalog> {
        info!("Crawling mountain directory {}", directory_url);
        let directory = self.fetcher.fetch(directory_url).await?;
        let entries = parse_directory(&directory, &self.base_url)?;
        debug!("Directory lists {} mountains", entries.len());

        let mut catalog = MountainCatalog::new();
        for (name, page_url) in entries {
            pause(self.delay).await;
            let page = self.fetcher.fetch(&page_url).await?;
            let urls = parse_elevation_links(&page, &self.base_url)
                .map_err(|e| ForecastError::parse(format!("{name} ({page_url}): {e}")))?;
            debug!("{} has {} elevation pages", name, urls.len());

            if catalog.urls(&name).is_some() {
                warn!("Mountain '{}' listed twice, keeping the later entry", name);
            }
            catalog.insert(name, urls);
        }

        Ok(catalog)
    }
}

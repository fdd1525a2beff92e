//! End-to-end collection run: catalog, extraction, merge

use reqwest::Url;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::MountainForecastConfig;
use crate::dataset::{self, MergeSummary};
use crate::models::{MountainCatalog, ProcessingPeriod};
use crate::source::{CatalogLoader, ForecastExtractor, PageFetcher};
use crate::{ForecastError, Result};

/// Options of a single `scrape` run
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    /// Crawl the directory even when a catalog cache exists
    pub refresh_catalog: bool,
    /// Restrict the run to these mountains; empty means all
    pub mountains: Vec<String>,
}

/// What a run collected and where it went
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub mountains: usize,
    pub pages: usize,
    pub records: usize,
    pub dataset: PathBuf,
    pub merge: MergeSummary,
}

fn parse_url(name: &str, value: &str) -> Result<Url> {
    Url::parse(value)
        .map_err(|e| ForecastError::config(format!("Source {name} '{value}' is not a valid URL: {e}")))
}

fn catalog_loader<'a>(
    config: &MountainForecastConfig,
    fetcher: &'a dyn PageFetcher,
) -> Result<CatalogLoader<'a>> {
    let base_url = parse_url("base_url", &config.source.base_url)?;
    Ok(CatalogLoader::new(
        fetcher,
        base_url,
        config.source.request_delay(),
    ))
}

/// Crawl the directory and rewrite the catalog cache
pub async fn crawl(
    config: &MountainForecastConfig,
    fetcher: &dyn PageFetcher,
) -> Result<MountainCatalog> {
    let directory_url = parse_url("directory_url", &config.source.directory_url)?;
    catalog_loader(config, fetcher)?
        .refresh(&config.storage.catalog_cache, &directory_url)
        .await
}

/// Collect forecasts for every cataloged elevation page and merge them into
/// the dataset of `period`
pub async fn scrape(
    config: &MountainForecastConfig,
    fetcher: &dyn PageFetcher,
    period: ProcessingPeriod,
    options: &ScrapeOptions,
) -> Result<RunSummary> {
    let directory_url = parse_url("directory_url", &config.source.directory_url)?;
    let loader = catalog_loader(config, fetcher)?;
    let cache_path = &config.storage.catalog_cache;

    let mut catalog = if options.refresh_catalog {
        loader.refresh(cache_path, &directory_url).await?
    } else {
        loader.get_catalog(cache_path, &directory_url).await?
    };

    if !options.mountains.is_empty() {
        for name in catalog.retain_mountains(&options.mountains) {
            warn!("Mountain '{}' is not in the catalog", name);
        }
        if catalog.is_empty() {
            return Err(ForecastError::config(
                "None of the requested mountains are in the catalog",
            ));
        }
    }

    info!(
        "Collecting {} mountains, {} elevation pages for {}-{:02}",
        catalog.len(),
        catalog.url_count(),
        period.year,
        period.month
    );
    let extractor = ForecastExtractor::new(fetcher, config.source.request_delay(), period);
    let records = extractor.extract_forecasts(&catalog).await?;
    let record_count = records.len();

    let dataset_path = config.storage.dataset_path(period);
    let merge = dataset::merge_and_persist(records, &dataset_path)?;

    Ok(RunSummary {
        mountains: catalog.len(),
        pages: catalog.url_count(),
        records: record_count,
        dataset: dataset_path,
        merge,
    })
}

//! `mountain-forecast` - multi-elevation mountain weather forecast collector
//!
//! This library crawls the mountain catalog of mountain-forecast.com,
//! reshapes each elevation's forecast table into records and merge-upserts
//! them into a cumulative monthly CSV dataset.

pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod source;

// Re-export core types for public API
pub use crate::config::MountainForecastConfig;
pub use dataset::{MergeSummary, merge_and_persist, merge_records};
pub use error::ForecastError;
pub use models::{ForecastRecord, MountainCatalog, NaturalKey, ProcessingPeriod};
pub use pipeline::{RunSummary, ScrapeOptions};
pub use source::{CacheLookup, CatalogLoader, ForecastExtractor, HttpFetcher, PageFetcher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ForecastError>;

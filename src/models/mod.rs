//! Data models for the forecast collector
//!
//! This module contains the core domain models organized by concern:
//! - Catalog: Mountain names and their elevation-band forecast pages
//! - Forecast: One forecast row per mountain, date, elevation and time slot
//! - Period: The month a run is processed in

pub mod catalog;
pub mod forecast;
pub mod period;

// Re-export all public types for convenient access
pub use catalog::MountainCatalog;
pub use forecast::{DATASET_COLUMNS, ForecastRecord, NaturalKey};
pub use period::ProcessingPeriod;

//! Configuration management for the forecast collector
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::ForecastError;
use crate::models::ProcessingPeriod;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MountainForecastConfig {
    /// Forecast site settings
    #[serde(default)]
    pub source: SourceConfig,
    /// Catalog cache and dataset locations
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Forecast site settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Site root that relative links are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Directory page listing the mountains to collect
    #[serde(default = "default_directory_url")]
    pub directory_url: String,
    /// Politeness delay between page fetches in milliseconds
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// File locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Catalog cache file (mountain name -> elevation URLs)
    #[serde(default = "default_catalog_cache")]
    pub catalog_cache: PathBuf,
    /// Directory holding the monthly dataset files
    #[serde(default = "default_dataset_dir")]
    pub dataset_dir: PathBuf,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "https://www.mountain-forecast.com/".to_string()
}

fn default_directory_url() -> String {
    "https://www.mountain-forecast.com/countries/United-States?top100=yes".to_string()
}

fn default_request_delay() -> u64 {
    1000
}

fn default_timeout() -> u32 {
    30
}

fn default_user_agent() -> String {
    format!("mountain-forecast/{}", crate::VERSION)
}

fn default_catalog_cache() -> PathBuf {
    PathBuf::from("data").join("mountain_urls.json")
}

fn default_dataset_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            directory_url: default_directory_url(),
            request_delay_ms: default_request_delay(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            catalog_cache: default_catalog_cache(),
            dataset_dir: default_dataset_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl SourceConfig {
    #[must_use]
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }
}

impl StorageConfig {
    /// Dataset file for a processing period, e.g. `mountain_weather_forecasts_dataset_10_2026.csv`
    #[must_use]
    pub fn dataset_path(&self, period: ProcessingPeriod) -> PathBuf {
        self.dataset_dir.join(format!(
            "mountain_weather_forecasts_dataset_{}_{}.csv",
            period.month, period.year
        ))
    }
}

impl MountainForecastConfig {
    /// Load configuration from the default location and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // e.g. MOUNTAIN_FORECAST_SOURCE__REQUEST_DELAY_MS=2000
        builder = builder.add_source(
            Environment::with_prefix("MOUNTAIN_FORECAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: MountainForecastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mountain-forecast").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.source.base_url.is_empty() {
            self.source.base_url = default_base_url();
        }
        if self.source.directory_url.is_empty() {
            self.source.directory_url = default_directory_url();
        }
        if self.source.timeout_seconds == 0 {
            self.source.timeout_seconds = default_timeout();
        }
        if self.source.user_agent.is_empty() {
            self.source.user_agent = default_user_agent();
        }
        if self.storage.catalog_cache.as_os_str().is_empty() {
            self.storage.catalog_cache = default_catalog_cache();
        }
        if self.storage.dataset_dir.as_os_str().is_empty() {
            self.storage.dataset_dir = default_dataset_dir();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_urls()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_urls(&self) -> Result<()> {
        for (name, value) in [
            ("base_url", &self.source.base_url),
            ("directory_url", &self.source.directory_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(ForecastError::config(format!(
                    "Source {name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
            reqwest::Url::parse(value)
                .with_context(|| format!("Source {name} '{value}' is not a valid URL"))?;
        }
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.source.timeout_seconds > 300 {
            return Err(
                ForecastError::config("Request timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.source.request_delay_ms > 60_000 {
            return Err(
                ForecastError::config("Request delay cannot exceed 60000 ms (1 minute)").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ForecastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ForecastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}

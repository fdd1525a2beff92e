//! Error types and handling for the forecast collector

use thiserror::Error;

/// Main error type for the forecast collector
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Page fetch errors (transport failure or non-success status)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Expected page structure is missing or malformed
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Catalog cache file exists but cannot be used
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// Dataset CSV read/write errors
    #[error("Dataset error: {message}")]
    Dataset { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ForecastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a new dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        Self::Dataset {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ForecastError::Config { .. } => {
                "Configuration error. Please check your config file and environment.".to_string()
            }
            ForecastError::Network { .. } => {
                "Unable to reach the forecast site. Please check your internet connection."
                    .to_string()
            }
            ForecastError::Parse { message } => {
                format!("The forecast site returned an unexpected page: {message}")
            }
            ForecastError::Cache { .. } => {
                "The catalog cache is corrupt. Delete it or run `crawl` to rebuild it.".to_string()
            }
            ForecastError::Dataset { message } => {
                format!("Could not update the dataset: {message}")
            }
            ForecastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for ForecastError {
    fn from(err: reqwest::Error) -> Self {
        ForecastError::network(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::dataset(err.to_string())
    }
}

use std::time::Duration;
use thiserror::Error;

pub mod config;
pub mod detail;
pub mod fetcher;
pub mod harvest;
pub mod links;
pub mod pagination;
pub mod types;

// Re-export commonly used types
pub use crate::config::HarvestConfig;
pub use crate::types::{DetailOutcome, HarvestReport, HikeRecord};

/// The `ScraperError` enum represents the errors that can occur while harvesting hikes.
#[derive(Error, Debug)]
pub enum ScraperError {
    /// Represents an error that occurs during an HTTP request.
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// Every attempt to fetch a URL failed.
    #[error("All {attempts} attempts failed for {url}")]
    RetriesExhausted { url: String, attempts: u32 },
    /// Represents an error that occurs while setting up content extraction.
    #[error("Content extraction failed: {0}")]
    ExtractionError(String),
    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<::config::ConfigError> for ScraperError {
    fn from(err: ::config::ConfigError) -> Self {
        ScraperError::ConfigError(err.to_string())
    }
}

/// A type alias for `Result` with the `ScraperError` error type.
pub type Result<T> = std::result::Result<T, ScraperError>;

// Constants

/// The sentinel stored in a field that could not be located.
pub const NOT_AVAILABLE: &str = "N/A";
/// The summary stored when a detail page has no body container.
pub const NO_SUMMARY: &str = "No summary provided";
/// The summary stored when a detail page could not be fetched at all.
pub const REQUEST_FAILED: &str = "request failed";

/// The default timeout duration for HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// The default number of detail pages fetched at once.
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 1;
/// The default number of attempts per request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// The default linear backoff base.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(2);
/// The default number of hikes on one listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 30;
/// The default exclusive ceiling of the listing offsets.
pub const DEFAULT_MAX_OFFSET: u32 = 6000;

use crate::{Result, ScraperError};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// The placeholder substituted with the listing offset.
pub const OFFSET_PLACEHOLDER: &str = "{offset}";

/// The `HarvestConfig` struct holds the configuration settings for a harvest run.
/// It includes the target site profile, the retry policy and the politeness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// The number of detail pages fetched at once.
    pub concurrent_requests: usize,
    /// The timeout for a single HTTP request, in seconds.
    pub timeout_secs: u64,
    /// The number of attempts made for every request.
    pub max_retries: u32,
    /// The linear backoff base, in milliseconds.
    pub backoff_base_ms: u64,
    /// The user agent sent with requests. `None` keeps the client default.
    pub user_agent: Option<String>,
    /// Whether progress bars are drawn.
    pub show_progress: bool,
    /// The site being harvested.
    pub site: SiteConfig,
    /// The delays inserted between requests.
    pub politeness: PolitenessConfig,
}

/// The `SiteConfig` struct describes where listing and detail pages live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Listing page URL containing an `{offset}` placeholder.
    pub listing_url_template: String,
    /// Prefix every detail page URL starts with.
    pub detail_url_prefix: String,
    /// The offset step between two listing pages.
    pub page_size: u32,
    /// Exclusive upper bound of the listing offsets.
    pub max_offset: u32,
    /// Stop paginating at the first listing page that was fetched but had no hike links.
    pub stop_on_empty_page: bool,
}

/// The `PolitenessConfig` struct holds the pauses between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolitenessConfig {
    /// Lower bound of the random pause after a listing page, in milliseconds.
    pub listing_delay_min_ms: u64,
    /// Upper bound of the random pause after a listing page, in milliseconds.
    pub listing_delay_max_ms: u64,
    /// Fixed pause after a detail page, in milliseconds.
    pub detail_delay_ms: u64,
}

impl Default for HarvestConfig {
    /// Provides default values for the `HarvestConfig` struct.
    ///
    /// # Returns
    ///
    /// A `HarvestConfig` instance targeting the WTA hike listings.
    fn default() -> Self {
        Self {
            concurrent_requests: crate::DEFAULT_CONCURRENT_REQUESTS,
            timeout_secs: crate::DEFAULT_TIMEOUT.as_secs(),
            max_retries: crate::DEFAULT_MAX_RETRIES,
            backoff_base_ms: crate::DEFAULT_BACKOFF_BASE.as_millis() as u64,
            user_agent: None,
            show_progress: true,
            site: SiteConfig::default(),
            politeness: PolitenessConfig::default(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            listing_url_template: String::from(
                "https://www.wta.org/go-outside/hikes/?b_start:int={offset}",
            ),
            detail_url_prefix: String::from("https://www.wta.org/go-hiking/hikes/"),
            page_size: crate::DEFAULT_PAGE_SIZE,
            max_offset: crate::DEFAULT_MAX_OFFSET,
            stop_on_empty_page: true,
        }
    }
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            listing_delay_min_ms: 200,
            listing_delay_max_ms: 500,
            detail_delay_ms: 200,
        }
    }
}

impl HarvestConfig {
    /// Loads the configuration by layering the defaults, an optional file and
    /// `WTA_HARVEST_`-prefixed environment variables, in increasing priority.
    ///
    /// Nested keys use a double underscore, e.g. `WTA_HARVEST_SITE__MAX_OFFSET=900`.
    ///
    /// # Arguments
    ///
    /// * `path` - The configuration file. A missing file is not an error.
    ///
    /// # Returns
    ///
    /// A validated `HarvestConfig`, or an error if a source is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let settings = Config::builder()
            .add_source(Config::try_from(&HarvestConfig::default())?)
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix("WTA_HARVEST")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: HarvestConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would make a harvest meaningless.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| -> Result<()> { Err(ScraperError::ConfigError(msg.to_string())) };

        if self.max_retries == 0 {
            return invalid("max_retries must be at least 1");
        }
        if self.timeout_secs == 0 {
            return invalid("timeout_secs must be at least 1");
        }
        if self.concurrent_requests == 0 {
            return invalid("concurrent_requests must be at least 1");
        }
        if self.site.page_size == 0 {
            return invalid("site.page_size must be at least 1");
        }
        if !self.site.listing_url_template.contains(OFFSET_PLACEHOLDER) {
            return invalid("site.listing_url_template must contain {offset}");
        }
        if self.site.detail_url_prefix.is_empty() {
            return invalid("site.detail_url_prefix must not be empty");
        }
        if self.politeness.listing_delay_min_ms > self.politeness.listing_delay_max_ms {
            return invalid("politeness.listing_delay_min_ms exceeds listing_delay_max_ms");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

impl SiteConfig {
    /// Builds the listing page URL for one offset.
    pub fn listing_url(&self, offset: u32) -> String {
        self.listing_url_template
            .replace(OFFSET_PLACEHOLDER, &offset.to_string())
    }

    /// The listing offsets visited, in ascending order.
    pub fn offsets(&self) -> impl Iterator<Item = u32> {
        (0..self.max_offset).step_by(self.page_size.max(1) as usize)
    }
}

impl PolitenessConfig {
    /// Samples the pause taken after a listing page.
    pub fn listing_delay(&self) -> Duration {
        let min = self.listing_delay_min_ms;
        let max = self.listing_delay_max_ms.max(min);
        Duration::from_millis(fastrand::u64(min..=max))
    }

    pub fn detail_delay(&self) -> Duration {
        Duration::from_millis(self.detail_delay_ms)
    }
}

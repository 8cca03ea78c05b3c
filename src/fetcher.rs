use crate::{HarvestConfig, Result, ScraperError};
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// Returns the pause taken after the failed attempt with the given zero-based index.
///
/// The schedule is linear: `base`, `2 * base`, `3 * base`, ...
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt.saturating_add(1))
}

/// The `Fetcher` performs GET requests with a bounded number of attempts and
/// linear backoff between them. It is the only component that touches the network.
#[derive(Clone)]
pub struct Fetcher {
    /// The HTTP client used for making requests.
    client: Client,
    /// The number of attempts made per URL.
    max_retries: u32,
    /// The backoff base.
    backoff_base: Duration,
}

impl Fetcher {
    /// Creates a new `Fetcher` with the retry policy and client settings of the given configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Fetcher`, or an error if the client could not be created.
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout()).gzip(true);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder.build().map_err(ScraperError::RequestError)?;

        Ok(Self {
            client,
            max_retries: config.max_retries.max(1),
            backoff_base: config.backoff_base(),
        })
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Fetches the body of a URL, retrying on transport errors and error statuses.
    ///
    /// 4xx and 5xx responses are treated alike. After each failed attempt the
    /// fetcher waits `backoff_delay(base, attempt)` before going on.
    ///
    /// # Returns
    ///
    /// The response body, or `ScraperError::RetriesExhausted` once every attempt failed.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching {}", url);

        for attempt in 0..self.max_retries {
            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!("Attempt {} failed for {}: {}", attempt + 1, url, e);
                    sleep(backoff_delay(self.backoff_base, attempt)).await;
                }
            }
        }

        error!("All retries failed for {}", url);
        Err(ScraperError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.max_retries,
        })
    }

    /// Makes a single attempt. Reading the body is part of the attempt.
    async fn try_fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        debug!("Response status: {}", response.status());

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_linear_and_strictly_increasing() {
        let base = Duration::from_secs(2);
        let delays: Vec<Duration> = (0..3).map(|attempt| backoff_delay(base, attempt)).collect();

        assert_eq!(
            delays,
            vec![
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(6)
            ]
        );
        assert!(delays.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_fetcher_never_makes_zero_attempts() {
        let mut config = HarvestConfig::default();
        config.max_retries = 0;
        let fetcher = Fetcher::new(&config).unwrap();
        assert_eq!(fetcher.max_retries(), 1);
    }
}

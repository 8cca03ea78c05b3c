use crate::detail::DetailParser;
use crate::fetcher::Fetcher;
use crate::links::LinkExtractor;
use crate::pagination::Paginator;
use crate::types::SkippedUrl;
use crate::{DetailOutcome, HarvestConfig, HarvestReport, HikeRecord, Result, ScraperError};
use chrono::{DateTime, Local};
use futures::{stream, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::time::sleep;
use tracing::{error, info};

/// The `Harvester` drives a complete run: gather the listing, scrape every
/// detail page and write the records to a timestamped JSON file.
pub struct Harvester {
    /// The configuration settings for the run.
    config: HarvestConfig,
    fetcher: Fetcher,
    extractor: LinkExtractor,
    parser: DetailParser,
    /// The progress bars shown during the run.
    progress: MultiProgress,
}

impl Harvester {
    /// Creates a new `Harvester` with the given configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Harvester`, or an error if the HTTP client or
    /// a selector could not be created.
    pub fn new(config: HarvestConfig) -> Result<Self> {
        config.validate()?;

        let fetcher = Fetcher::new(&config)?;
        let extractor = LinkExtractor::new(config.site.detail_url_prefix.clone())?;
        let parser = DetailParser::new()?;

        let progress = if config.show_progress {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        Ok(Self {
            config,
            fetcher,
            extractor,
            parser,
            progress,
        })
    }

    /// Runs the whole harvest and writes the output into `output_dir`.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `HarvestReport`, or an error if the output file
    /// could not be written. Scraping problems never fail the run.
    pub async fn run(&self, output_dir: impl AsRef<Path>) -> Result<HarvestReport> {
        info!("Gathering hike URLs");
        let urls = self.gather_urls().await;
        let discovered = urls.len();

        info!("Fetching {} hike detail pages", discovered);
        let outcomes = self.scrape_all(urls).await;

        let mut records = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome {
                DetailOutcome::Collected(record) => records.push(record),
                DetailOutcome::Skipped { url, reason } => skipped.push(SkippedUrl { url, reason }),
            }
        }

        let output_path = write_records(output_dir.as_ref(), &records, Local::now())?;
        let failed_requests = records.iter().filter(|r| r.is_request_failed()).count();

        info!(
            "Wrote {} hikes to {} ({} failed requests, {} skipped)",
            records.len(),
            output_path.display(),
            failed_requests,
            skipped.len()
        );

        Ok(HarvestReport {
            output_path,
            discovered,
            collected: records.len(),
            failed_requests,
            skipped,
        })
    }

    /// Walks the listing pages and returns the deduplicated detail URLs.
    pub async fn gather_urls(&self) -> HashSet<String> {
        let pages = self.config.site.offsets().count() as u64;
        let listing_pb = self.progress.add(ProgressBar::new(pages));
        listing_pb.set_style(bar_style());
        listing_pb.set_prefix("Listing pages");

        let paginator = Paginator::new(
            &self.fetcher,
            &self.extractor,
            &self.config.site,
            &self.config.politeness,
        );
        let urls = paginator.gather_urls(&listing_pb).await;

        listing_pb.finish_with_message(format!("{} hike URLs", urls.len()));
        urls
    }

    /// Scrapes every URL, isolating failures to the URL that caused them.
    pub async fn scrape_all(&self, urls: impl IntoIterator<Item = String>) -> Vec<DetailOutcome> {
        let urls: Vec<String> = urls.into_iter().collect();
        let detail_pb = self.progress.add(ProgressBar::new(urls.len() as u64));
        detail_pb.set_style(bar_style());
        detail_pb.set_prefix("Hike details");

        let outcomes = stream::iter(urls)
            .map(|url| {
                let detail_pb = detail_pb.clone();
                async move {
                    detail_pb.set_message(url.clone());

                    let outcome = match self.scrape_detail(&url).await {
                        Ok(record) => DetailOutcome::Collected(record),
                        Err(e) => {
                            error!("Error scraping {}: {}", url, e);
                            DetailOutcome::Skipped {
                                url,
                                reason: e.to_string(),
                            }
                        }
                    };

                    detail_pb.inc(1);
                    sleep(self.config.politeness.detail_delay()).await;
                    outcome
                }
            })
            .buffer_unordered(self.config.concurrent_requests.max(1))
            .collect::<Vec<_>>()
            .await;

        let collected = outcomes.iter().filter(|o| o.record().is_some()).count();
        detail_pb.finish_with_message(format!(
            "Completed: {} of {} hikes collected",
            collected,
            outcomes.len()
        ));
        outcomes
    }

    /// Fetches and parses one detail page.
    ///
    /// A page that cannot be fetched, including a link that is not a valid URL,
    /// gives the `"request failed"` record.
    pub async fn scrape_detail(&self, url: &str) -> Result<HikeRecord> {
        match self.fetcher.fetch(url).await {
            Ok(html) => Ok(self.parser.parse(&html, url)),
            Err(ScraperError::RetriesExhausted { .. }) => Ok(HikeRecord::request_failed(url)),
            Err(e) => Err(e),
        }
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix:.bold} [{bar:40.green}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Returns the output file name for the given time, `wta_hikes_YYYY-MM-DD_HH-MM-SS.json`.
pub fn output_file_name(timestamp: DateTime<Local>) -> String {
    format!("wta_hikes_{}.json", timestamp.format("%Y-%m-%d_%H-%M-%S"))
}

/// Writes the records as a pretty-printed JSON array into `dir`.
///
/// # Returns
///
/// The path of the written file.
pub fn write_records(
    dir: &Path,
    records: &[HikeRecord],
    timestamp: DateTime<Local>,
) -> Result<PathBuf> {
    let path = dir.join(output_file_name(timestamp));
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

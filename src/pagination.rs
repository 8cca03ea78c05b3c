use crate::config::{PolitenessConfig, SiteConfig};
use crate::fetcher::Fetcher;
use crate::links::LinkExtractor;
use indicatif::ProgressBar;
use std::collections::HashSet;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// The `Paginator` walks the listing pages and collects every distinct detail URL.
pub struct Paginator<'a> {
    fetcher: &'a Fetcher,
    extractor: &'a LinkExtractor,
    site: &'a SiteConfig,
    politeness: &'a PolitenessConfig,
}

impl<'a> Paginator<'a> {
    pub fn new(
        fetcher: &'a Fetcher,
        extractor: &'a LinkExtractor,
        site: &'a SiteConfig,
        politeness: &'a PolitenessConfig,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            site,
            politeness,
        }
    }

    /// Gathers the detail URLs of every listing page, in ascending offset order.
    ///
    /// A listing page that cannot be fetched counts as empty. A random pause
    /// follows every offset, whether or not its fetch succeeded. With
    /// `stop_on_empty_page` set, a page that was fetched but held no hike link
    /// ends the walk before `max_offset`.
    ///
    /// # Arguments
    ///
    /// * `progress` - Advanced by one for every offset visited.
    ///
    /// # Returns
    ///
    /// The deduplicated set of detail URLs.
    pub async fn gather_urls(&self, progress: &ProgressBar) -> HashSet<String> {
        let mut urls = HashSet::new();

        for offset in self.site.offsets() {
            let listing_url = self.site.listing_url(offset);
            progress.set_message(format!("offset {}", offset));

            let fetched = match self.fetcher.fetch(&listing_url).await {
                Ok(html) => Some(self.extractor.extract(&html)),
                Err(e) => {
                    warn!("Listing page at offset {} skipped: {}", offset, e);
                    None
                }
            };
            progress.inc(1);

            let end_of_listing = match fetched {
                Some(links) => {
                    debug!("Offset {} yielded {} links", offset, links.len());
                    let empty = links.is_empty();
                    urls.extend(links);
                    empty && self.site.stop_on_empty_page
                }
                None => false,
            };

            sleep(self.politeness.listing_delay()).await;

            if end_of_listing {
                info!("No hikes listed at offset {}, stopping pagination", offset);
                break;
            }
        }

        info!("Discovered {} unique hike URLs", urls.len());
        urls
    }
}

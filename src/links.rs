use crate::{Result, ScraperError};
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;

/// Anchors holding the hike links on a listing page.
pub const LISTING_LINK_SELECTOR: &str = "h3.listitem-title a";

/// The `LinkExtractor` pulls detail page URLs out of a listing page.
pub struct LinkExtractor {
    selector: Selector,
    detail_prefix: String,
}

impl LinkExtractor {
    /// Creates a `LinkExtractor` keeping only links that start with `detail_prefix`.
    pub fn new(detail_prefix: impl Into<String>) -> Result<Self> {
        Self::with_selector(LISTING_LINK_SELECTOR, detail_prefix)
    }

    /// Creates a `LinkExtractor` using a custom anchor selector.
    pub fn with_selector(selector: &str, detail_prefix: impl Into<String>) -> Result<Self> {
        let selector = Selector::parse(selector).map_err(|e| {
            ScraperError::ExtractionError(format!("Invalid link selector '{}': {:?}", selector, e))
        })?;

        Ok(Self {
            selector,
            detail_prefix: detail_prefix.into(),
        })
    }

    /// Extracts the detail page URLs from a listing page.
    ///
    /// Anchors without an `href`, or whose `href` does not start with the detail
    /// prefix (navigation, ads, external links), are discarded. A page without any
    /// matching anchor gives an empty set.
    pub fn extract(&self, html: &str) -> HashSet<String> {
        let document = Html::parse_document(html);

        document
            .select(&self.selector)
            .filter_map(|link| {
                let href = link.value().attr("href")?;
                if href.starts_with(&self.detail_prefix) {
                    Some(href.to_string())
                } else {
                    debug!("Ignoring link: {}", href);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "https://www.wta.org/go-hiking/hikes/";

    /// Three hike anchors, one off-site anchor and one anchor outside the headings.
    #[test]
    fn test_extract_keeps_only_detail_links() {
        let html = r#"
            <html><body>
                <nav><a href="https://www.wta.org/go-hiking/hikes/nav-link">Nav</a></nav>
                <div class="search-result-item">
                    <h3 class="listitem-title"><a href="https://www.wta.org/go-hiking/hikes/rattlesnake-ledge">Rattlesnake Ledge</a></h3>
                </div>
                <div class="search-result-item">
                    <h3 class="listitem-title"><a href="https://www.wta.org/go-hiking/hikes/mount-si">Mount Si</a></h3>
                </div>
                <div class="search-result-item">
                    <h3 class="listitem-title"><a href="https://www.wta.org/go-hiking/hikes/lake-serene">Lake Serene</a></h3>
                </div>
                <div class="search-result-item">
                    <h3 class="listitem-title"><a href="https://ads.example.com/boots">Buy boots</a></h3>
                </div>
                <div class="search-result-item">
                    <h3 class="listitem-title"><a>No href</a></h3>
                </div>
            </body></html>
        "#;

        let extractor = LinkExtractor::new(PREFIX).unwrap();
        let links = extractor.extract(html);

        assert_eq!(links.len(), 3);
        assert!(links.contains("https://www.wta.org/go-hiking/hikes/rattlesnake-ledge"));
        assert!(links.contains("https://www.wta.org/go-hiking/hikes/mount-si"));
        assert!(links.contains("https://www.wta.org/go-hiking/hikes/lake-serene"));
        assert!(links.iter().all(|link| link.starts_with(PREFIX)));
    }

    #[test]
    fn test_extract_empty_page() {
        let extractor = LinkExtractor::new(PREFIX).unwrap();
        assert!(extractor.extract("<html><body></body></html>").is_empty());
        assert!(extractor.extract("").is_empty());
    }

    #[test]
    fn test_relative_links_are_rejected() {
        let html = r#"<h3 class="listitem-title"><a href="/go-hiking/hikes/mount-si">Mount Si</a></h3>"#;
        let extractor = LinkExtractor::new(PREFIX).unwrap();
        assert!(extractor.extract(html).is_empty());
    }

    #[test]
    fn test_invalid_selector() {
        let result = LinkExtractor::with_selector("h3[", PREFIX);
        assert!(matches!(result, Err(ScraperError::ExtractionError(_))));
    }
}

use crate::{HikeRecord, Result, ScraperError, NOT_AVAILABLE, NO_SUMMARY};
use scraper::{ElementRef, Html, Selector};
use tracing::instrument;

/// Labels of the stat blocks read from a detail page.
pub const LENGTH_LABEL: &str = "Length";
pub const ELEVATION_GAIN_LABEL: &str = "Elevation Gain";
pub const HIGHEST_POINT_LABEL: &str = "Highest Point";
pub const DIFFICULTY_LABEL: &str = "Calculated Difficulty";

/// The `DetailParser` struct turns a hike detail page into a `HikeRecord`.
/// Each field is looked up on its own, so a missing block only affects that field.
pub struct DetailParser {
    /// The page heading holding the hike name.
    title: Selector,
    /// One labeled stat block.
    stat_block: Selector,
    /// The label inside a stat block.
    stat_label: Selector,
    /// The value inside a stat block.
    stat_value: Selector,
    rating: Selector,
    /// The container of the hike description.
    body: Selector,
    paragraph: Selector,
}

impl DetailParser {
    /// Creates a `DetailParser` for the WTA detail page layout.
    ///
    /// # Returns
    ///
    /// A `Result` containing the parser, or an error if a selector fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            title: parse_selector("h1.documentFirstHeading")?,
            stat_block: parse_selector("div.hike-stats__stat")?,
            stat_label: parse_selector("dt")?,
            stat_value: parse_selector("dd")?,
            rating: parse_selector("div.AverageRating div.current-rating")?,
            body: parse_selector("#hike-body-text")?,
            paragraph: parse_selector("p")?,
        })
    }

    /// Extracts a `HikeRecord` from the given detail page.
    ///
    /// # Arguments
    ///
    /// * `html` - The detail page markup.
    /// * `url` - The URL the page was fetched from, stored as-is.
    ///
    /// # Returns
    ///
    /// A complete record. Fields that cannot be located hold `"N/A"`; a page
    /// without a body container gets `"No summary provided"`.
    #[instrument(skip(self, html), fields(html_length = html.len()))]
    pub fn parse(&self, html: &str, url: &str) -> HikeRecord {
        let document = Html::parse_document(html);

        HikeRecord {
            title: self
                .first_match(&document, &self.title)
                .map(stripped_text)
                .unwrap_or_else(not_available),
            url: url.to_string(),
            distance: self.stat(&document, LENGTH_LABEL),
            elevation_gain: self.stat(&document, ELEVATION_GAIN_LABEL),
            high_point: self.stat(&document, HIGHEST_POINT_LABEL),
            calculated_difficulty: self.stat(&document, DIFFICULTY_LABEL),
            rating: self
                .first_match(&document, &self.rating)
                .map(trimmed_text)
                .unwrap_or_else(not_available),
            summary: self.summary(&document),
        }
    }

    fn first_match<'a>(&self, document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
        document.select(selector).next()
    }

    /// Reads the first value among the stat blocks whose label contains `label`.
    fn stat(&self, document: &Html, label: &str) -> String {
        document
            .select(&self.stat_block)
            .filter(|block| {
                block
                    .select(&self.stat_label)
                    .any(|dt| dt.text().collect::<String>().contains(label))
            })
            .find_map(|block| block.select(&self.stat_value).next())
            .map(trimmed_text)
            .unwrap_or_else(not_available)
    }

    /// Joins the body paragraphs with a blank line.
    fn summary(&self, document: &Html) -> String {
        match self.first_match(document, &self.body) {
            Some(body) => body
                .select(&self.paragraph)
                .map(stripped_text)
                .collect::<Vec<_>>()
                .join("\n\n"),
            None => NO_SUMMARY.to_string(),
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| {
        ScraperError::ExtractionError(format!("Invalid selector '{}': {:?}", selector, e))
    })
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// The element text with surrounding whitespace removed.
fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Every text node trimmed on its own and concatenated.
fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

use crate::{NOT_AVAILABLE, REQUEST_FAILED};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One harvested hike. Every field is always present; a field that could not be
/// located holds the `"N/A"` sentinel instead of being omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HikeRecord {
    pub title: String,
    /// The detail page URL that was fetched. Never a sentinel.
    pub url: String,
    pub distance: String,
    pub elevation_gain: String,
    pub high_point: String,
    pub calculated_difficulty: String,
    pub rating: String,
    /// Body paragraphs separated by a blank line.
    pub summary: String,
}

impl HikeRecord {
    /// The record stored for a detail page that could not be fetched.
    pub fn request_failed(url: impl Into<String>) -> Self {
        Self {
            title: NOT_AVAILABLE.to_string(),
            url: url.into(),
            distance: NOT_AVAILABLE.to_string(),
            elevation_gain: NOT_AVAILABLE.to_string(),
            high_point: NOT_AVAILABLE.to_string(),
            calculated_difficulty: NOT_AVAILABLE.to_string(),
            rating: NOT_AVAILABLE.to_string(),
            summary: REQUEST_FAILED.to_string(),
        }
    }

    pub fn is_request_failed(&self) -> bool {
        self.summary == REQUEST_FAILED
    }
}

/// What happened to a single detail URL during a harvest.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    Collected(HikeRecord),
    Skipped { url: String, reason: String },
}

impl DetailOutcome {
    pub fn record(&self) -> Option<&HikeRecord> {
        match self {
            DetailOutcome::Collected(record) => Some(record),
            DetailOutcome::Skipped { .. } => None,
        }
    }
}

/// A URL left out of the output, with the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUrl {
    pub url: String,
    pub reason: String,
}

/// The result of a complete harvest run.
#[derive(Debug, Clone)]
pub struct HarvestReport {
    /// The JSON file the records were written to.
    pub output_path: PathBuf,
    /// The number of distinct detail URLs discovered.
    pub discovered: usize,
    /// The number of records written.
    pub collected: usize,
    /// Records whose detail page could not be fetched.
    pub failed_requests: usize,
    pub skipped: Vec<SkippedUrl>,
}

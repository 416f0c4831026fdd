// src/pipeline.rs
//
// Top-level load path: prefer the pre-cleaned remote CSV, fall back to a
// live scrape + normalize. Either way the caller gets a fully normalized
// dataset or an error — never a partial one.

use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::clean::{self, CleanReport};
use crate::config::{CLEANED_CSV_URL, SOURCE_URL};
use crate::dataset::Dataset;
use crate::error::ScrapeError;
use crate::extract;
use crate::fetch;

/// Which path produced the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Pre-cleaned remote CSV.
    Cleaned,
    /// Live scrape of the source page, normalized here.
    Scraped,
}

/// One successful load: the shared dataset plus its clean report. The CSV
/// path needed no cleaning, so its report is empty.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub dataset: Dataset,
    pub report: CleanReport,
    pub source: Source,
}

/// Load from the pre-cleaned CSV only.
pub fn load_cleaned(client: &Client) -> Result<LoadOutcome, ScrapeError> {
    let body = fetch::fetch_text(client, CLEANED_CSV_URL)?;
    let dataset = clean::csv::parse_cleaned_csv(&body)?;
    info!(rows = dataset.len(), cols = dataset.width(), "loaded pre-cleaned dataset");
    Ok(LoadOutcome {
        dataset,
        report: CleanReport::default(),
        source: Source::Cleaned,
    })
}

/// Load by scraping and normalizing the source page.
pub fn load_scraped(client: &Client) -> Result<LoadOutcome, ScrapeError> {
    let raw = extract::scrape_table(client, SOURCE_URL)?;
    let (dataset, report) = clean::normalize(&raw)?;
    info!(rows = dataset.len(), cols = dataset.width(), "scraped and normalized dataset");
    Ok(LoadOutcome {
        dataset,
        report,
        source: Source::Scraped,
    })
}

/// Preferred load order: cleaned file first, live scrape as fallback.
#[tracing::instrument(skip(client))]
pub fn load(client: &Client) -> Result<LoadOutcome, ScrapeError> {
    match load_cleaned(client) {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            warn!(error = %e, "pre-cleaned CSV unavailable; falling back to live scrape");
            load_scraped(client)
        }
    }
}

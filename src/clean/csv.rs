// src/clean/csv.rs
//
// Loader for the already-cleaned wide CSV published next to the dashboard.
// Headers arrive slugged and lowercased, but the defensive slug pass runs
// regardless; column types are inferred per column.

use csv::ReaderBuilder;
use tracing::debug;

use crate::dataset::{Column, Dataset};
use crate::error::ScrapeError;

use super::text::{clean_numeric_cell, defensive_slug};

/// Parse the pre-cleaned CSV body into a typed dataset.
pub fn parse_cleaned_csv(text: &str) -> Result<Dataset, ScrapeError> {
    let mut reader = ReaderBuilder::new().from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ScrapeError::parse(format!("unreadable CSV header: {}", e)))?
        .clone();

    let mut names: Vec<String> = Vec::with_capacity(headers.len());
    for header in headers.iter() {
        let base = defensive_slug(header);
        let mut candidate = base.clone();
        let mut counter = 1;
        while names.contains(&candidate) {
            candidate = format!("{}_{}", base, counter);
            counter += 1;
        }
        names.push(candidate);
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| ScrapeError::parse(format!("unreadable CSV record: {}", e)))?;
        rows.push(record.iter().map(|c| c.trim().to_string()).collect());
    }
    if rows.is_empty() {
        return Err(ScrapeError::Empty);
    }
    debug!(rows = rows.len(), cols = names.len(), "parsed pre-cleaned CSV");

    // A column is numeric iff every non-empty cell parses as a finite
    // number and at least one does. Empty cells are missing either way.
    let columns: Vec<Column> = (0..names.len())
        .map(|j| {
            let cells: Vec<&str> = rows.iter().map(|r| r.get(j).map_or("", String::as_str)).collect();
            let parsed: Vec<Option<f64>> = cells
                .iter()
                .map(|c| if c.is_empty() { None } else { clean_numeric_cell(c) })
                .collect();
            let numeric = parsed.iter().flatten().count() > 0
                && cells
                    .iter()
                    .zip(&parsed)
                    .all(|(c, p)| c.is_empty() || p.is_some());
            if numeric {
                Column::Numbers(parsed)
            } else {
                Column::Text(
                    cells
                        .iter()
                        .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                        .collect(),
                )
            }
        })
        .collect();

    Dataset::new(names, columns)
}

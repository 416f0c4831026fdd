// src/error.rs

use thiserror::Error;

/// Everything the pipeline can fail with. All three kinds are recoverable:
/// callers report the condition and offer a manual retry; no partial dataset
/// is ever returned.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network failure, timeout, or non-2xx response.
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// An expected structural element is absent, or header and data column
    /// counts cannot be reconciled.
    #[error("parse failed: {0}")]
    Parse(String),

    /// The page was well-formed but yielded zero usable rows.
    #[error("no usable rows extracted")]
    Empty,
}

impl ScrapeError {
    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        ScrapeError::Parse(msg.into())
    }
}

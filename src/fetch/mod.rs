// src/fetch/mod.rs

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::config::HTTP_TIMEOUT;
use crate::error::ScrapeError;

/// Build the shared blocking client. One client per process; every request
/// carries the same fixed timeout.
pub fn client() -> Result<Client, ScrapeError> {
    let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
    Ok(client)
}

/// GET `url` and return the body as text. The URL is validated before any
/// request goes out; a malformed one is a [`ScrapeError::Parse`]. Single
/// attempt, no retries; a non-2xx status or any transport error surfaces as
/// [`ScrapeError::Fetch`].
pub fn fetch_text(client: &Client, url: &str) -> Result<String, ScrapeError> {
    let url = Url::parse(url)
        .map_err(|e| ScrapeError::parse(format!("invalid URL {:?}: {}", url, e)))?;
    debug!(%url, "fetching");
    let body = client.get(url.clone()).send()?.error_for_status()?.text()?;
    debug!(%url, bytes = body.len(), "fetched");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CLEANED_CSV_URL, SOURCE_URL};

    #[test]
    fn malformed_url_is_a_parse_error_before_any_request() {
        let client = client().unwrap();
        let err = fetch_text(&client, "not a url").unwrap_err();
        assert!(matches!(err, ScrapeError::Parse(_)));
    }

    #[test]
    fn configured_urls_are_well_formed() {
        assert!(Url::parse(SOURCE_URL).is_ok());
        assert!(Url::parse(CLEANED_CSV_URL).is_ok());
    }
}

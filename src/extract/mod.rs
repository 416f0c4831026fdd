// src/extract/mod.rs
//
// Turns the source page's HTML into a RawTable. One table, identified by a
// fixed id; header/data column-count mismatches are reconciled here so the
// normalizer always sees a rectangular header.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::config::TABLE_ID;
use crate::error::ScrapeError;
use crate::fetch;

/// Trailing cell glyph on some body rows; an artifact of the source markup,
/// not data.
const ROW_ARROW: &str = "→";

/// One extracted table: column names plus string rows. Row lengths may still
/// vary; the normalizer pads them. `headers.len()` always equals the width of
/// the first data row.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

static TH: Lazy<Selector> = Lazy::new(|| Selector::parse("th").expect("valid th selector"));
static TBODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody").expect("valid tbody selector"));
static TR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid tr selector"));
static TD: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid td selector"));

fn cell_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Generated placeholder names, used when the page's visual header row has
/// merged or decorative cells the simple `<th>` walk cannot count.
pub fn placeholder_headers(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Column_{}", i)).collect()
}

/// Parse the fetched page and extract the population table.
pub fn parse_table(html: &str) -> Result<RawTable, ScrapeError> {
    let table_sel = Selector::parse(&format!("table#{}", TABLE_ID))
        .map_err(|e| ScrapeError::parse(format!("bad table selector: {:?}", e)))?;

    let doc = Html::parse_document(html);
    let table = doc
        .select(&table_sel)
        .next()
        .ok_or_else(|| ScrapeError::parse(format!("table #{} not found on page", TABLE_ID)))?;

    // Header candidates: trimmed, non-empty th texts in document order.
    let candidates: Vec<String> = table
        .select(&TH)
        .map(cell_text)
        .filter(|t| !t.is_empty())
        .collect();

    let tbody = table
        .select(&TBODY)
        .next()
        .ok_or_else(|| ScrapeError::parse("table body (tbody) not found"))?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for tr in tbody.select(&TR) {
        let mut cells: Vec<String> = tr.select(&TD).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }
        if cells.last().map(String::as_str) == Some(ROW_ARROW) {
            cells.pop();
        }
        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    if rows.is_empty() {
        return Err(ScrapeError::Empty);
    }
    debug!(rows = rows.len(), "extracted table body");

    let n = rows[0].len();
    if n == 0 {
        return Err(ScrapeError::parse("could not determine data column count"));
    }

    let headers = if candidates.len() >= n {
        candidates[..n].to_vec()
    } else {
        warn!(
            found = candidates.len(),
            expected = n,
            "not enough valid headers; using generated column names"
        );
        placeholder_headers(n)
    };

    // Reconciliation failure here means the scrape logic itself is wrong;
    // never truncate rows to paper over it.
    if headers.len() != n {
        return Err(ScrapeError::parse(format!(
            "reconciled header count {} does not match data column count {}",
            headers.len(),
            n
        )));
    }

    Ok(RawTable { headers, rows })
}

/// Fetch `url` and extract the population table from it.
pub fn scrape_table(client: &Client, url: &str) -> Result<RawTable, ScrapeError> {
    let html = fetch::fetch_text(client, url)?;
    parse_table(&html)
}

static P: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("valid p selector"));
static HTML_ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&[a-zA-Z0-9#]+;").unwrap());
static STRAY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WS_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Extract every paragraph of the page as cleaned plain text: HTML entities
/// and stray tags removed, whitespace collapsed, empties dropped.
pub fn parse_paragraphs(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    doc.select(&P)
        .filter_map(|p| {
            let raw = p.text().collect::<Vec<_>>().join(" ");
            let s = HTML_ENTITY.replace_all(&raw, " ");
            let s = STRAY_TAG.replace_all(&s, "");
            let s = WS_RUN.replace_all(&s, " ").trim().to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        })
        .collect()
}

/// Fetch `url` and extract its cleaned paragraph texts.
pub fn scrape_paragraphs(client: &Client, url: &str) -> Result<Vec<String>, ScrapeError> {
    let html = fetch::fetch_text(client, url)?;
    Ok(parse_paragraphs(&html))
}

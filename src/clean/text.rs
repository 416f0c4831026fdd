// src/clean/text.rs
//
// Cell- and name-level cleaning primitives shared by the normalizer and the
// pre-cleaned CSV loader.

use once_cell::sync::Lazy;
use regex::Regex;

static WS_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static BRACKET_NOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\[[^\]]*\]").unwrap());
static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());
static BRACKET_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[()\[\]]+").unwrap());
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").unwrap());
// Basic alphanumerics, the Arabic block, hyphens and whitespace survive;
// everything else is dropped.
static NON_CATEGORICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s\u{0600}-\u{06FF}\-]").unwrap());
static NON_WORD_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Coerce one raw cell to a number. Thousands-separator commas and
/// surrounding whitespace are stripped; the source's "data suppressed"
/// ellipsis and anything unparseable become missing, never an error.
pub fn clean_numeric_cell(raw: &str) -> Option<f64> {
    let no_commas = raw.replace(',', "");
    let s = no_commas.trim();
    if s.is_empty() || s == "…" || s == "..." {
        return None;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

/// Sanitize one categorical cell. Empty after cleaning is missing, not an
/// empty string.
pub fn clean_text_cell(raw: &str) -> Option<String> {
    let s = NON_CATEGORICAL.replace_all(raw, "");
    let s = WS_RUN.replace_all(&s, " ");
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Drop a `[...]` annotation from an entity name ("Al-Qāhirah [Cairo]" →
/// "Al-Qāhirah"). The annotation is presentational, not data.
pub fn strip_bracket_note(raw: &str) -> String {
    BRACKET_NOTE.replace_all(raw, "").trim().to_string()
}

/// Reduce a column name to its canonical slug: embedded YYYY-MM-DD dates,
/// bracket characters and all whitespace removed, lowercased.
pub fn slug_column_name(name: &str) -> String {
    let s = ISO_DATE.replace_all(name, "");
    let s = BRACKET_CHARS.replace_all(&s, "");
    let s = WS_RUN.replace_all(&s, "");
    s.to_lowercase()
}

/// First 4-digit year token in a column name, if any.
pub fn extract_year(name: &str) -> Option<u16> {
    YEAR.find(name).and_then(|m| m.as_str().parse().ok())
}

/// Slug pass for headers arriving from the pre-cleaned file: punctuation
/// dropped, trimmed, spaces to underscores, lowercased. Applied even though
/// those headers should already be slugged.
pub fn defensive_slug(name: &str) -> String {
    NON_WORD_SPACE
        .replace_all(name, "")
        .trim()
        .replace(' ', "_")
        .to_lowercase()
}

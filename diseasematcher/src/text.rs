//! Canonical forms of free-text names and scraped paragraphs.
//!
//! Disease names arrive from two independently scraped sites with different
//! punctuation, casing and spacing ("Alzheimer's disease" vs "alzheimers
//! disease"). Every comparison and every dedup key goes through [`normalize`]
//! first.

use std::sync::LazyLock;

use regex::Regex;

use crate::field::Field;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").expect("static pattern"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static pattern"));

/// Lowercase, keep only `[a-z0-9\s-]`, collapse whitespace and trim.
///
/// Never fails: empty input gives an empty string.
///
/// ```
/// use diseasematcher::text::normalize;
///
/// assert_eq!(normalize("  Alzheimer's   Disease "), "alzheimers disease");
/// assert_eq!(normalize("COVID-19 (coronavirus)"), "covid-19 coronavirus");
/// ```
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let lower = text.to_lowercase();
    let kept = DISALLOWED.replace_all(&lower, "");
    WHITESPACE.replace_all(&kept, " ").trim().to_string()
}

/// Collapse whitespace runs in display text.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Display text for a scraped paragraph; sentinels become empty.
pub fn clean_text(field: &Field) -> String {
    match field {
        Field::Present(text) => collapse_whitespace(text),
        Field::Absent(_) => String::new(),
    }
}

/// Tokens used by the overlap score: whitespace split, longer than two chars.
pub fn significant_tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split(' ').filter(|token| token.len() > 2)
}

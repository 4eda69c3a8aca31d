//! Scraped text fields and the sentinel strings the scrapers use for "no data".
//!
//! The scraping tools write placeholders such as `"Information not found"`,
//! `"NOT_FOUND"` or `"ERROR - timeout"` into the same columns as real text.
//! [`Field::from_raw`] recognises them once at load time so the matcher only
//! ever sees `Present` text or an `Absent` reason.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Exact sentinel values written by the disease and drug scrapers.
const NOT_FOUND_SENTINELS: &[&str] = &[
    "information not found",
    "tests information not found",
    "treatment information not found",
    "medications information not found",
    "side effects not found",
    "not_found",
    "n/a",
];

/// Why a field carries no usable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbsentReason {
    /// Empty or whitespace-only cell.
    Missing,
    /// The scraper reached the page but found no such section.
    NotFound,
    /// The scraper failed; carries the message after `"ERROR - "` or `"ERROR:"`.
    ScrapeError(String),
}

/// A free-text field that may hold a sentinel instead of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Present(String),
    Absent(AbsentReason),
}

impl Default for Field {
    fn default() -> Self {
        Field::Absent(AbsentReason::Missing)
    }
}

impl Field {
    /// Classify a raw cell value.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Field::Absent(AbsentReason::Missing);
        }

        if let Some(message) = scrape_error_message(trimmed) {
            return Field::Absent(AbsentReason::ScrapeError(message.to_string()));
        }

        let lower = trimmed.to_lowercase();
        if trimmed.starts_with("NO_") || NOT_FOUND_SENTINELS.contains(&lower.as_str()) {
            return Field::Absent(AbsentReason::NotFound);
        }

        Field::Present(trimmed.to_string())
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::Present(text) => Some(text),
            Field::Absent(_) => None,
        }
    }

    /// Present text, or an empty string.
    pub fn text_or_empty(&self) -> &str {
        self.as_text().unwrap_or("")
    }

    /// Present text, or `placeholder` when absent.
    pub fn text_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.as_text().unwrap_or(placeholder)
    }

    /// Render back to the sentinel convention used by the scraper CSVs.
    pub fn to_sentinel(&self) -> String {
        match self {
            Field::Present(text) => text.clone(),
            Field::Absent(AbsentReason::Missing) => String::new(),
            Field::Absent(AbsentReason::NotFound) => "Information not found".to_string(),
            Field::Absent(AbsentReason::ScrapeError(message)) if message.is_empty() => {
                "ERROR".to_string()
            }
            Field::Absent(AbsentReason::ScrapeError(message)) => format!("ERROR - {}", message),
        }
    }
}

/// Message of an `ERROR`, `ERROR - msg` or `ERROR: msg` sentinel.
fn scrape_error_message(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("ERROR")?;
    if rest.is_empty() {
        return Some("");
    }
    let rest = rest.trim_start();
    let message = rest.strip_prefix('-').or_else(|| rest.strip_prefix(':'))?;
    Some(message.trim())
}

impl From<&str> for Field {
    fn from(raw: &str) -> Self {
        Field::from_raw(raw)
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| Field::from_raw(&s)).unwrap_or_default())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_sentinel())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_present_and_trimmed() {
        assert_eq!(
            Field::from_raw("  Blood tests and imaging "),
            Field::Present("Blood tests and imaging".into())
        );
    }

    #[test]
    fn not_found_sentinels_are_absent() {
        for raw in [
            "Information not found",
            "Tests information not found",
            "Treatment information not found",
            "Medications information not found",
            "Side effects not found",
            "NOT_FOUND",
            "N/A",
            "NO_DIAGNOSIS_URL",
        ] {
            assert_eq!(Field::from_raw(raw), Field::Absent(AbsentReason::NotFound), "{raw}");
        }
    }

    #[test]
    fn error_sentinel_keeps_message() {
        assert_eq!(
            Field::from_raw("ERROR - Navigation timeout"),
            Field::Absent(AbsentReason::ScrapeError("Navigation timeout".into()))
        );
        assert_eq!(
            Field::from_raw("ERROR"),
            Field::Absent(AbsentReason::ScrapeError(String::new()))
        );
    }

    #[test]
    fn error_prefix_needs_a_separator() {
        assert_eq!(
            Field::from_raw("ERRORS IN DOSING are rare"),
            Field::Present("ERRORS IN DOSING are rare".into())
        );
        assert_eq!(
            Field::from_raw("ERROR: boom"),
            Field::Absent(AbsentReason::ScrapeError("boom".into()))
        );
        assert_eq!(
            Field::from_raw("ERROR-boom"),
            Field::Absent(AbsentReason::ScrapeError("boom".into()))
        );
    }

    #[test]
    fn empty_is_missing() {
        assert_eq!(Field::from_raw("   "), Field::Absent(AbsentReason::Missing));
        assert_eq!(Field::default().text_or_empty(), "");
    }

    #[test]
    fn sentinel_rendering_at_the_boundary() {
        assert_eq!(Field::from_raw("NOT_FOUND").to_sentinel(), "Information not found");
        assert_eq!(Field::from_raw("ERROR - boom").to_sentinel(), "ERROR - boom");
        assert_eq!(Field::from_raw("text").to_sentinel(), "text");
    }
}

//! Medication name to drug detail lookup.
//!
//! Medication names come from the relationship catalog; drug details come from
//! a separately scraped catalog keyed by drug name. The lookup cascade mirrors
//! how the two sources disagree in practice:
//!
//! 1. **Placeholder**: empty name or `"No medications listed"`
//! 2. **Exact match**: case-insensitive, first catalog entry wins
//! 3. **Substring match**: first catalog entry whose name contains the query
//! 4. **Not found**: fixed placeholder text
//!
//! Found details are truncated for display at sentence or word boundaries.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{CatalogKind, MatchError, Result};
use crate::field::Field;

pub const NO_MEDICATIONS: &str = "No medications listed";
pub const WHAT_IS_UNAVAILABLE: &str = "Information not available";
pub const WHAT_IS_NOT_IN_DATABASE: &str = "Information not available in database";
pub const SIDE_EFFECTS_UNAVAILABLE: &str = "Side effects information not available";

pub const WHAT_IS_LIMIT: usize = 300;
pub const SIDE_EFFECTS_LIMIT: usize = 250;

/// One drug-detail catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrugDetail {
    pub drug_name: String,
    pub what_is: Field,
    pub side_effects: Field,
    pub url: String,
}

/// Why a lookup produced placeholder text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundReason {
    NoMedication,
    NotInCatalog,
}

/// Display text for one medication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupResult {
    Found {
        drug_name: String,
        what_is: String,
        side_effects: String,
        url: String,
    },
    NotFound {
        reason: NotFoundReason,
        what_is: &'static str,
        side_effects: &'static str,
    },
}

impl LookupResult {
    fn not_found(reason: NotFoundReason) -> Self {
        let what_is = match reason {
            NotFoundReason::NoMedication => WHAT_IS_UNAVAILABLE,
            NotFoundReason::NotInCatalog => WHAT_IS_NOT_IN_DATABASE,
        };
        LookupResult::NotFound {
            reason,
            what_is,
            side_effects: SIDE_EFFECTS_UNAVAILABLE,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LookupResult::Found { .. })
    }

    pub fn what_is(&self) -> &str {
        match self {
            LookupResult::Found { what_is, .. } => what_is,
            LookupResult::NotFound { what_is, .. } => what_is,
        }
    }

    pub fn side_effects(&self) -> &str {
        match self {
            LookupResult::Found { side_effects, .. } => side_effects,
            LookupResult::NotFound { side_effects, .. } => side_effects,
        }
    }
}

/// Truncation limits applied to found details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationLimits {
    pub what_is: usize,
    pub side_effects: usize,
}

impl Default for TruncationLimits {
    fn default() -> Self {
        TruncationLimits {
            what_is: WHAT_IS_LIMIT,
            side_effects: SIDE_EFFECTS_LIMIT,
        }
    }
}

/// Read-only index over the drug-detail catalog.
#[derive(Debug, Clone)]
pub struct DrugLookupIndex {
    entries: Vec<DrugDetail>,
    lowered_names: Vec<String>,
    exact: HashMap<String, usize>,
    limits: TruncationLimits,
}

impl DrugLookupIndex {
    /// Build the index; an empty catalog is an error.
    pub fn new(entries: Vec<DrugDetail>) -> Result<Self> {
        Self::with_limits(entries, TruncationLimits::default())
    }

    pub fn with_limits(entries: Vec<DrugDetail>, limits: TruncationLimits) -> Result<Self> {
        if entries.is_empty() {
            return Err(MatchError::EmptyCatalog(CatalogKind::DrugDetails));
        }

        let lowered_names: Vec<String> = entries
            .iter()
            .map(|entry| entry.drug_name.trim().to_lowercase())
            .collect();

        let mut exact = HashMap::with_capacity(lowered_names.len());
        for (position, name) in lowered_names.iter().enumerate() {
            if !name.is_empty() {
                exact.entry(name.clone()).or_insert(position);
            }
        }

        Ok(DrugLookupIndex {
            entries,
            lowered_names,
            exact,
            limits,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Catalog entry for `medication_name`, without truncation.
    pub fn find(&self, medication_name: &str) -> Option<&DrugDetail> {
        let query = medication_name.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        if let Some(&position) = self.exact.get(&query) {
            return Some(&self.entries[position]);
        }

        self.lowered_names
            .iter()
            .position(|name| name.contains(query.as_str()))
            .map(|position| &self.entries[position])
    }

    /// Display-ready details for `medication_name`.
    pub fn lookup(&self, medication_name: &str) -> LookupResult {
        if medication_name.trim().is_empty() || medication_name == NO_MEDICATIONS {
            return LookupResult::not_found(NotFoundReason::NoMedication);
        }

        match self.find(medication_name) {
            Some(detail) => LookupResult::Found {
                drug_name: detail.drug_name.clone(),
                what_is: truncate(
                    detail.what_is.text_or(WHAT_IS_UNAVAILABLE),
                    self.limits.what_is,
                ),
                side_effects: truncate(
                    detail.side_effects.text_or(SIDE_EFFECTS_UNAVAILABLE),
                    self.limits.side_effects,
                ),
                url: detail.url.clone(),
            },
            None => LookupResult::not_found(NotFoundReason::NotInCatalog),
        }
    }
}

/// Shorten `text` to about `max_len` characters at a natural boundary.
///
/// - a sentence terminator past 70% of the limit: cut after it
/// - else a space past 80% of the limit: cut there and append `...`
/// - else hard cut at the limit and append `...`
///
/// Lengths and positions count characters, so multi-byte text never splits
/// inside a code point.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let prefix: Vec<char> = text.chars().take(max_len).collect();

    let last_sentence_end = prefix.iter().rposition(|c| matches!(c, '.' | '!' | '?'));
    if let Some(end) = last_sentence_end {
        if end as f64 > max_len as f64 * 0.7 {
            return prefix[..=end].iter().collect();
        }
    }

    let last_space = prefix.iter().rposition(|c| *c == ' ');
    if let Some(space) = last_space {
        if space as f64 > max_len as f64 * 0.8 {
            let mut cut: String = prefix[..space].iter().collect();
            cut.push_str("...");
            return cut;
        }
    }

    let mut cut: String = prefix.into_iter().collect();
    cut.push_str("...");
    cut
}

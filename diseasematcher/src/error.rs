//! Error types for catalog loading and matching.

use std::fmt;

use thiserror::Error;

/// Top-level inputs the pipeline refuses to run without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Diseases,
    Relationships,
    DrugDetails,
    MatchedDiseases,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogKind::Diseases => "disease catalog",
            CatalogKind::Relationships => "drug relationship catalog",
            CatalogKind::DrugDetails => "drug detail catalog",
            CatalogKind::MatchedDiseases => "matched disease table",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("{0} is empty")]
    EmptyCatalog(CatalogKind),

    #[error("{kind} is missing required column '{column}'")]
    MissingColumn { kind: CatalogKind, column: &'static str },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_kind_names_itself() {
        let kinds = [
            CatalogKind::Diseases,
            CatalogKind::Relationships,
            CatalogKind::DrugDetails,
            CatalogKind::MatchedDiseases,
        ];
        let messages: Vec<String> = kinds
            .iter()
            .map(|kind| MatchError::EmptyCatalog(*kind).to_string())
            .collect();
        assert_eq!(messages[3], "matched disease table is empty");
        for (i, message) in messages.iter().enumerate() {
            assert!(!messages[..i].contains(message), "{message}");
        }
    }
}

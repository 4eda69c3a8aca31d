//! # Diseasematcher
//!
//! Cross-references scraped disease records with scraped drug-relationship
//! records by fuzzy disease-name matching, then attaches drug details to each
//! matched medication.
//!
//! ## Pipeline Overview
//!
//! 1. **Normalization** ([`text`]): canonical lowercase ASCII names
//! 2. **Scoring** ([`similarity`]): exact, substring, then token overlap
//! 3. **Matching** ([`matcher`]): relationship rows above threshold feed each disease
//! 4. **Translation** ([`translate`]): curated English to Spanish names
//! 5. **Lookup** ([`lookup`]): medication name to drug details
//! 6. **Reporting** ([`report`]): summaries and per-disease reports
//!
//! [`catalog`] holds the CSV/JSON boundary; everything else works on
//! in-memory values.
//!
//! ```
//! use diseasematcher::{DiseaseDrugMatcher, DiseaseSource, DrugRelationship};
//!
//! let diseases = vec![DiseaseSource::new("Asthma")];
//! let relationships = vec![
//!     DrugRelationship::new("Asthma", "Albuterol"),
//!     DrugRelationship::new("Bronchitis", "Amoxicillin"),
//! ];
//!
//! let records = DiseaseDrugMatcher::default()
//!     .match_catalogs(&diseases, &relationships)
//!     .unwrap();
//! assert_eq!(records[0].spanish_name, "asma");
//! assert_eq!(records[0].medications, ["Albuterol"]);
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod field;
pub mod lookup;
pub mod matcher;
pub mod report;
pub mod segment;
pub mod similarity;
pub mod text;
pub mod translate;

pub use config::{AppConfig, CandidateStrategy, MatcherConfig, ReportConfig};
pub use error::{CatalogKind, MatchError, Result};
pub use field::{AbsentReason, Field};
pub use lookup::{DrugDetail, DrugLookupIndex, LookupResult, TruncationLimits};
pub use matcher::{DiseaseDrugMatcher, DiseaseRecord, DiseaseSource, DrugRelationship, MedicationList};
pub use report::{DiseaseReport, MatchSummary, TargetReport};
pub use segment::{SegmentExtractor, Segments};
pub use similarity::similarity;
pub use text::normalize;
pub use translate::translate;

use tracing_subscriber::EnvFilter;

/// Install the `fmt` subscriber; `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));
    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

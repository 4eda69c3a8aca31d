//! Runtime configuration for the matcher and report binaries.
//!
//! Every field has a default matching the behaviour of the scraping
//! pipeline, so a config file only needs the values it overrides:
//!
//! ```json
//! { "matcher": { "candidate_strategy": "token_blocked" } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};
use crate::lookup::{SIDE_EFFECTS_LIMIT, WHAT_IS_LIMIT};
use crate::similarity::MATCH_THRESHOLD;

pub const APP_NAME: &str = "diseasematcher";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info"
}

/// Which relationship rows get scored against a disease.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStrategy {
    /// Score every relationship row.
    #[default]
    Exhaustive,
    /// Score only rows sharing a significant token with the disease name.
    /// Faster on large catalogs; pure substring matches without a shared
    /// token ("diabetes" / "prediabetes") are lost.
    TokenBlocked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub similarity_threshold: f64,
    /// Link texts scraped as drug names that are not drugs.
    pub excluded_drug_names: Vec<String>,
    pub candidate_strategy: CandidateStrategy,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            similarity_threshold: MATCH_THRESHOLD,
            excluded_drug_names: vec!["Prescribing Information".to_string()],
            candidate_strategy: CandidateStrategy::Exhaustive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub target_diseases: Vec<String>,
    pub what_is_limit: usize,
    pub side_effects_limit: usize,
    /// Maximum characters per text block in disease sections.
    pub chunk_size: usize,
    /// Rows in the "top diseases by medication count" table.
    pub top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            target_diseases: [
                "Heart disease",
                "Chronic kidney disease",
                "COPD",
                "Pneumonia",
                "Stroke",
                "Dementia",
                "Depression (major depressive disorder)",
                "High cholesterol",
                "Obesity",
                "Arthritis",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            what_is_limit: WHAT_IS_LIMIT,
            side_effects_limit: SIDE_EFFECTS_LIMIT,
            chunk_size: 500,
            top_n: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub matcher: MatcherConfig,
    pub report: ReportConfig,
}

impl AppConfig {
    /// Load from a JSON file; absent keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, or the file at `path` when one is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.matcher.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(MatchError::Config(format!(
                "similarity_threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        if self.report.chunk_size == 0 {
            return Err(MatchError::Config("chunk_size must be positive".into()));
        }
        if self.report.what_is_limit == 0 || self.report.side_effects_limit == 0 {
            return Err(MatchError::Config("truncation limits must be positive".into()));
        }
        Ok(())
    }
}

//! Disease to medication cross-referencing.
//!
//! Each canonical disease row (primary catalog) draws its medications from the
//! relationship catalog: every relationship whose disease name scores at or
//! above the similarity threshold contributes its drug name. Matching is
//! directional, so two similar source diseases are never merged; each keeps
//! its own record.
//!
//! ## Pipeline
//!
//! 1. **Dedup**: skip disease rows whose raw name was already seen (first wins)
//! 2. **Scan**: score the disease against relationship rows
//! 3. **Accumulate**: keep drug names in discovery order, case-insensitively unique
//! 4. **Assemble**: Spanish name, cleaned text fields, medication list
//!
//! Scans for distinct diseases are independent and run on the rayon pool;
//! results are collected in source order.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{CandidateStrategy, MatcherConfig};
use crate::error::{CatalogKind, MatchError, Result};
use crate::field::Field;
use crate::similarity::normalized_similarity;
use crate::text::{clean_text, normalize, significant_tokens};
use crate::translate::translate;

/// One row of the primary disease catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiseaseSource {
    /// Disease name, the key matched against relationship rows
    pub name: String,
    /// "Diagnosis" page text
    pub diagnosis: Field,
    /// "Treatment" page text
    pub treatment: Field,
    /// Tests and procedures text
    pub tests: Field,
    /// Medications paragraph from the disease page; matching ignores it
    pub medications: Field,
}

impl DiseaseSource {
    pub fn new(name: impl Into<String>) -> Self {
        DiseaseSource {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// One observed (disease, drug) edge from the drug catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrugRelationship {
    /// Disease (condition) name as the drug site lists it
    pub disease: String,
    /// Drug class, may be empty
    pub drug_family: String,
    /// Medication name
    pub drug_name: String,
    /// Drug detail page, may be empty
    pub drug_url: String,
}

impl DrugRelationship {
    pub fn new(disease: impl Into<String>, drug_name: impl Into<String>) -> Self {
        DrugRelationship {
            disease: disease.into(),
            drug_name: drug_name.into(),
            ..Default::default()
        }
    }
}

/// Insertion-ordered medication names, unique ignoring case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicationList {
    names: Vec<String>,
    keys: HashSet<String>,
}

impl MedicationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name` unless an equal name (ignoring case) is already present.
    pub fn insert(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || !self.keys.insert(name.to_lowercase()) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn into_vec(self) -> Vec<String> {
        self.names
    }
}

impl<'a> FromIterator<&'a str> for MedicationList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut list = MedicationList::new();
        for name in iter {
            list.insert(name);
        }
        list
    }
}

/// A source disease enriched with its matched medications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiseaseRecord {
    /// Name from the disease catalog
    pub english_name: String,
    /// Translated name, or the English name when no entry applies
    pub spanish_name: String,
    /// Cleaned diagnosis text, empty when not available
    pub diagnosis: String,
    /// Cleaned treatment text, empty when not available
    pub treatments: String,
    /// Cleaned tests text, empty when not available
    pub tests: String,
    /// Distinct medications in first-seen order
    pub medications: Vec<String>,
}

impl DiseaseRecord {
    /// Medications joined the way the spreadsheet columns show them.
    pub fn medications_display(&self) -> String {
        self.medications.join("; ")
    }
}

/// Relationship catalog with names normalized once up front.
struct PreparedRelationships<'a> {
    rows: &'a [DrugRelationship],
    normalized: Vec<String>,
    token_index: Option<HashMap<String, Vec<usize>>>,
}

impl<'a> PreparedRelationships<'a> {
    fn new(rows: &'a [DrugRelationship], strategy: CandidateStrategy) -> Self {
        let normalized: Vec<String> = rows.iter().map(|row| normalize(&row.disease)).collect();

        let token_index = match strategy {
            CandidateStrategy::Exhaustive => None,
            CandidateStrategy::TokenBlocked => {
                let mut index: HashMap<String, Vec<usize>> = HashMap::new();
                for (position, name) in normalized.iter().enumerate() {
                    let tokens: HashSet<&str> = significant_tokens(name).collect();
                    for token in tokens {
                        index.entry(token.to_string()).or_default().push(position);
                    }
                }
                Some(index)
            }
        };

        PreparedRelationships {
            rows,
            normalized,
            token_index,
        }
    }

    /// Row positions to score for a normalized disease name, ascending.
    fn candidates(&self, disease: &str) -> Vec<usize> {
        match &self.token_index {
            None => (0..self.rows.len()).collect(),
            Some(index) => {
                let mut positions: Vec<usize> = significant_tokens(disease)
                    .filter_map(|token| index.get(token))
                    .flatten()
                    .copied()
                    .collect();
                positions.sort_unstable();
                positions.dedup();
                positions
            }
        }
    }
}

/// Cross-references a disease catalog with a drug relationship catalog.
#[derive(Debug, Clone, Default)]
pub struct DiseaseDrugMatcher {
    config: MatcherConfig,
}

impl DiseaseDrugMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        DiseaseDrugMatcher { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Match every distinct disease row, first occurrence winning.
    pub fn match_catalogs(
        &self,
        diseases: &[DiseaseSource],
        relationships: &[DrugRelationship],
    ) -> Result<Vec<DiseaseRecord>> {
        let (records, _) = self.match_with_seen(diseases, relationships, HashSet::new())?;
        Ok(records)
    }

    /// Like [`match_catalogs`](Self::match_catalogs), skipping raw names
    /// already in `seen` and returning the updated set.
    ///
    /// # Arguments
    ///
    /// * `diseases` - Primary catalog rows, in source order
    /// * `relationships` - Candidate (disease, drug) edges
    /// * `seen` - Raw disease names processed by earlier runs
    ///
    /// # Returns
    ///
    /// One record per newly seen disease name, in source order, and `seen`
    /// extended with those names.
    ///
    /// # Errors
    ///
    /// [`MatchError::EmptyCatalog`] when either catalog has no rows.
    pub fn match_with_seen(
        &self,
        diseases: &[DiseaseSource],
        relationships: &[DrugRelationship],
        mut seen: HashSet<String>,
    ) -> Result<(Vec<DiseaseRecord>, HashSet<String>)> {
        if diseases.is_empty() {
            return Err(MatchError::EmptyCatalog(CatalogKind::Diseases));
        }
        if relationships.is_empty() {
            return Err(MatchError::EmptyCatalog(CatalogKind::Relationships));
        }

        let pending: Vec<&DiseaseSource> = diseases
            .iter()
            .filter(|disease| !disease.name.trim().is_empty())
            .filter(|disease| seen.insert(disease.name.clone()))
            .collect();

        info!(
            diseases = pending.len(),
            skipped = diseases.len() - pending.len(),
            relationships = relationships.len(),
            strategy = ?self.config.candidate_strategy,
            "matching diseases against drug relationships"
        );

        let prepared = PreparedRelationships::new(relationships, self.config.candidate_strategy);
        let malformed = prepared.normalized.iter().filter(|name| name.is_empty()).count();
        if malformed > 0 {
            warn!(malformed, "relationship rows without a usable disease name");
        }

        let records: Vec<DiseaseRecord> = pending
            .into_par_iter()
            .map(|disease| self.assemble(disease, &prepared))
            .collect();

        let with_medications = records.iter().filter(|r| !r.medications.is_empty()).count();
        info!(
            records = records.len(),
            with_medications, "matching complete"
        );

        Ok((records, seen))
    }

    fn assemble(&self, disease: &DiseaseSource, prepared: &PreparedRelationships<'_>) -> DiseaseRecord {
        let medications = self.collect_medications(&disease.name, prepared);
        debug!(disease = %disease.name, medications = medications.len(), "matched");

        DiseaseRecord {
            english_name: disease.name.clone(),
            spanish_name: translate(&disease.name),
            diagnosis: clean_text(&disease.diagnosis),
            treatments: clean_text(&disease.treatment),
            tests: clean_text(&disease.tests),
            medications: medications.into_vec(),
        }
    }

    fn collect_medications(&self, disease_name: &str, prepared: &PreparedRelationships<'_>) -> MedicationList {
        let disease = normalize(disease_name);
        let mut medications = MedicationList::new();

        for position in prepared.candidates(&disease) {
            let candidate = &prepared.normalized[position];
            // Rows without a usable disease name are malformed.
            if candidate.is_empty() {
                continue;
            }
            if normalized_similarity(&disease, candidate) < self.config.similarity_threshold {
                continue;
            }

            let relationship = &prepared.rows[position];
            if let Field::Present(drug_name) = Field::from_raw(&relationship.drug_name) {
                if !self.is_excluded(&drug_name) {
                    medications.insert(&drug_name);
                }
            }
        }

        medications
    }

    fn is_excluded(&self, drug_name: &str) -> bool {
        self.config
            .excluded_drug_names
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(drug_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> DiseaseDrugMatcher {
        DiseaseDrugMatcher::default()
    }

    fn asthma() -> DiseaseSource {
        DiseaseSource {
            name: "Asthma".into(),
            diagnosis: Field::from_raw("Lung function tests such as spirometry."),
            treatment: Field::from_raw("Treatment information not found"),
            tests: Field::from_raw("ERROR - timeout"),
            medications: Field::default(),
        }
    }

    #[test]
    fn unrelated_relationships_do_not_leak() {
        let relationships = vec![
            DrugRelationship::new("Asthma", "Albuterol"),
            DrugRelationship::new("Bronchitis", "Amoxicillin"),
        ];
        let records = matcher().match_catalogs(&[asthma()], &relationships).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].english_name, "Asthma");
        assert_eq!(records[0].spanish_name, "asma");
        assert_eq!(records[0].medications, ["Albuterol"]);
    }

    #[test]
    fn sentinel_text_fields_become_empty() {
        let relationships = vec![DrugRelationship::new("Asthma", "Albuterol")];
        let record = &matcher().match_catalogs(&[asthma()], &relationships).unwrap()[0];

        assert_eq!(record.diagnosis, "Lung function tests such as spirometry.");
        assert_eq!(record.treatments, "");
        assert_eq!(record.tests, "");
    }

    #[test]
    fn medications_are_unique_ignoring_case_in_discovery_order() {
        let relationships = vec![
            DrugRelationship::new("Asthma", "Albuterol"),
            DrugRelationship::new("asthma, acute", "Prednisone"),
            DrugRelationship::new("Asthma", "ALBUTEROL"),
            DrugRelationship::new("Asthma - Maintenance", "Budesonide"),
        ];
        let record = &matcher().match_catalogs(&[asthma()], &relationships).unwrap()[0];
        assert_eq!(record.medications, ["Albuterol", "Prednisone", "Budesonide"]);
        assert_eq!(record.medications_display(), "Albuterol; Prednisone; Budesonide");
    }

    #[test]
    fn prescribing_information_and_sentinels_are_skipped() {
        let relationships = vec![
            DrugRelationship::new("Asthma", "Prescribing Information"),
            DrugRelationship::new("Asthma", ""),
            DrugRelationship::new("Asthma", "NOT_FOUND"),
            DrugRelationship::new("Asthma", "Montelukast"),
        ];
        let record = &matcher().match_catalogs(&[asthma()], &relationships).unwrap()[0];
        assert_eq!(record.medications, ["Montelukast"]);
    }

    #[test]
    fn empty_relationship_disease_is_malformed() {
        let relationships = vec![
            DrugRelationship::new("", "Ibuprofen"),
            DrugRelationship::new("???", "Naproxen"),
            DrugRelationship::new("Asthma", "Albuterol"),
        ];
        let record = &matcher().match_catalogs(&[asthma()], &relationships).unwrap()[0];
        assert_eq!(record.medications, ["Albuterol"]);
    }

    #[test]
    fn duplicate_disease_rows_keep_first() {
        let mut second = asthma();
        second.diagnosis = Field::from_raw("A later, different row");
        let diseases = vec![asthma(), DiseaseSource::new("asthma"), second];
        let relationships = vec![DrugRelationship::new("Asthma", "Albuterol")];

        let records = matcher().match_catalogs(&diseases, &relationships).unwrap();
        // Dedup is case-sensitive on the raw name: "asthma" is its own row.
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].diagnosis, "Lung function tests such as spirometry.");
        assert_eq!(records[1].english_name, "asthma");

        let again = matcher().match_catalogs(&diseases, &relationships).unwrap();
        assert_eq!(again, records);
    }

    #[test]
    fn seen_set_carries_across_runs() {
        let relationships = vec![DrugRelationship::new("Asthma", "Albuterol")];
        let (first, seen) = matcher()
            .match_with_seen(&[asthma()], &relationships, HashSet::new())
            .unwrap();
        assert_eq!(first.len(), 1);
        assert!(seen.contains("Asthma"));

        let (second, seen) = matcher()
            .match_with_seen(&[asthma(), DiseaseSource::new("Gout")], &relationships, seen)
            .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].english_name, "Gout");
        assert!(second[0].medications.is_empty());
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn output_follows_source_order() {
        let diseases: Vec<DiseaseSource> = ["Gout", "Asthma", "Obesity", "Acne"]
            .iter()
            .map(|name| DiseaseSource::new(*name))
            .collect();
        let relationships = vec![
            DrugRelationship::new("Acne", "Tretinoin"),
            DrugRelationship::new("Gout", "Allopurinol"),
        ];
        let records = matcher().match_catalogs(&diseases, &relationships).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.english_name.as_str()).collect();
        assert_eq!(names, ["Gout", "Asthma", "Obesity", "Acne"]);
        assert_eq!(records[3].medications, ["Tretinoin"]);
    }

    #[test]
    fn empty_catalogs_are_errors() {
        let relationships = vec![DrugRelationship::new("Asthma", "Albuterol")];
        assert!(matches!(
            matcher().match_catalogs(&[], &relationships),
            Err(MatchError::EmptyCatalog(CatalogKind::Diseases))
        ));
        assert!(matches!(
            matcher().match_catalogs(&[asthma()], &[]),
            Err(MatchError::EmptyCatalog(CatalogKind::Relationships))
        ));
    }

    #[test]
    fn token_blocking_agrees_on_token_overlap() {
        let diseases = vec![DiseaseSource::new("Chronic kidney disease"), asthma()];
        let relationships = vec![
            DrugRelationship::new("Kidney disease stage", "Lisinopril"),
            DrugRelationship::new("Asthma", "Albuterol"),
            DrugRelationship::new("Liver failure", "Lactulose"),
        ];

        let exhaustive = matcher().match_catalogs(&diseases, &relationships).unwrap();
        let blocked = DiseaseDrugMatcher::new(MatcherConfig {
            candidate_strategy: CandidateStrategy::TokenBlocked,
            ..MatcherConfig::default()
        })
        .match_catalogs(&diseases, &relationships)
        .unwrap();

        assert_eq!(exhaustive, blocked);
        assert_eq!(blocked[0].medications, ["Lisinopril"]);
    }

    #[test]
    fn token_blocking_drops_tokenless_substring_matches() {
        let diseases = vec![DiseaseSource::new("Diabetes")];
        let relationships = vec![DrugRelationship::new("Prediabetes", "Metformin")];

        let exhaustive = matcher().match_catalogs(&diseases, &relationships).unwrap();
        assert_eq!(exhaustive[0].medications, ["Metformin"]);

        let blocked = DiseaseDrugMatcher::new(MatcherConfig {
            candidate_strategy: CandidateStrategy::TokenBlocked,
            ..MatcherConfig::default()
        })
        .match_catalogs(&diseases, &relationships)
        .unwrap();
        assert!(blocked[0].medications.is_empty());
    }

    #[test]
    fn medication_list_collects_from_iterator() {
        let list: MedicationList = ["Aspirin", " aspirin ", "Ibuprofen", ""].into_iter().collect();
        assert_eq!(list.as_slice(), ["Aspirin", "Ibuprofen"]);
    }
}
